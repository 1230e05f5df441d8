//! Jenkins client facade
//!
//! A thin blocking wrapper over the handful of REST endpoints the CLI
//! consumes. Every method returns a `Result` and never prints; the command
//! layer owns the print-and-continue policy.

use crate::jenkins::error::JenkinsError;
use crate::jenkins::types::{
    BuildInfo, JobInfo, JobList, JobSummary, StageInfo, WhoAmI, WorkflowRun,
};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Per-request timeout so a dead server cannot hang the process forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection to one Jenkins server, created once at startup and used for
/// the whole process lifetime.
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: Client,
    base: Url,
    username: String,
    token: String,
}

impl JenkinsClient {
    /// Creates a client without touching the network.
    ///
    /// Most callers want [`JenkinsClient::connect`], which also verifies
    /// the credentials.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, JenkinsError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(JenkinsError::BadBase(base_url.to_string()));
        }
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base,
            username: username.into(),
            token: token.into(),
        })
    }

    /// Connects to the server and verifies the credentials with an
    /// identity query.
    ///
    /// This is the one fatal-on-init path in the program: a failure here
    /// should propagate up and terminate the process with a nonzero exit.
    pub fn connect(
        base_url: &str,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, JenkinsError> {
        let client = Self::new(base_url, username, token)?;
        let me = client.whoami()?;
        tracing::debug!(user = ?me.id, url = %client.base, "connected to Jenkins");
        Ok(client)
    }

    /// Identity of the authenticated user (`GET /me/api/json`).
    pub fn whoami(&self) -> Result<WhoAmI, JenkinsError> {
        self.get_json(&["me", "api", "json"], &[])
    }

    /// All jobs visible to the authenticated user.
    pub fn list_jobs(&self) -> Result<Vec<JobSummary>, JenkinsError> {
        let list: JobList = self.get_json(&["api", "json"], &[("tree", "jobs[name,url,color]")])?;
        Ok(list.jobs)
    }

    /// Detailed information about one job.
    pub fn job_info(&self, job: &str) -> Result<JobInfo, JenkinsError> {
        let mut segments = job_segments(job);
        segments.extend(["api".to_string(), "json".to_string()]);
        self.get_json(&segments, &[])
    }

    /// Triggers a build, with `buildWithParameters` when parameters are
    /// given and the plain `build` endpoint otherwise.
    pub fn build_job(
        &self,
        job: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<(), JenkinsError> {
        let mut segments = job_segments(job);
        let url = if parameters.is_empty() {
            segments.push("build".to_string());
            self.endpoint(&segments, &[])
        } else {
            segments.push("buildWithParameters".to_string());
            self.endpoint(&segments, &[])
        };
        tracing::debug!(%url, ?parameters, "POST");

        let mut request = self.http.post(url.clone());
        if !parameters.is_empty() {
            request = request.form(parameters);
        }
        let response = self.authed(request).send()?;
        check_status(response, &url)?;
        Ok(())
    }

    /// Snapshot of one build.
    pub fn build_info(&self, job: &str, number: u64) -> Result<BuildInfo, JenkinsError> {
        let mut segments = job_segments(job);
        segments.extend([number.to_string(), "api".to_string(), "json".to_string()]);
        self.get_json(&segments, &[])
    }

    /// Console text produced after byte offset `start`, plus the offset to
    /// resume from (the server's `X-Text-Size` header). Fetching only the
    /// new suffix keeps streaming cheap on long logs.
    pub fn console_output(
        &self,
        job: &str,
        number: u64,
        start: u64,
    ) -> Result<(String, u64), JenkinsError> {
        let mut segments = job_segments(job);
        segments.extend([
            number.to_string(),
            "logText".to_string(),
            "progressiveText".to_string(),
        ]);
        let url = self.endpoint(&segments, &[("start", &start.to_string())]);
        tracing::debug!(%url, "GET");

        let response = self.authed(self.http.get(url.clone())).send()?;
        let response = check_status(response, &url)?;
        let next = response
            .headers()
            .get("X-Text-Size")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(start);
        let text = response.text()?;
        Ok((text, next))
    }

    /// Pipeline stage list for one build. A freestyle job has no wfapi
    /// endpoint; its 404 comes back as an empty list, not an error.
    pub fn stages(&self, job: &str, number: u64) -> Result<Vec<StageInfo>, JenkinsError> {
        let mut segments = job_segments(job);
        segments.extend([
            number.to_string(),
            "wfapi".to_string(),
            "describe".to_string(),
        ]);
        match self.get_json::<WorkflowRun>(&segments, &[]) {
            Ok(run) => Ok(run.stages),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.token))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[impl AsRef<str>],
        query: &[(&str, &str)],
    ) -> Result<T, JenkinsError> {
        let url = self.endpoint(segments, query);
        tracing::debug!(%url, "GET");
        let response = self.authed(self.http.get(url.clone())).send()?;
        let response = check_status(response, &url)?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, segments: &[impl AsRef<str>], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment.as_ref());
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }
}

/// Expands a job name into URL path segments, handling folder-style names:
/// `team/app` becomes `job/team/job/app`.
fn job_segments(job: &str) -> Vec<String> {
    job.split('/')
        .filter(|part| !part.is_empty())
        .flat_map(|part| ["job".to_string(), part.to_string()])
        .collect()
}

fn check_status(response: Response, url: &Url) -> Result<Response, JenkinsError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(JenkinsError::Status {
            status,
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> JenkinsClient {
        JenkinsClient::new("http://jenkins.example.com", "user", "token").unwrap()
    }

    #[test]
    fn test_job_segments_plain() {
        assert_eq!(job_segments("app"), vec!["job", "app"]);
    }

    #[test]
    fn test_job_segments_folder() {
        assert_eq!(job_segments("team/app"), vec!["job", "team", "job", "app"]);
    }

    #[test]
    fn test_job_segments_ignores_empty_parts() {
        assert_eq!(job_segments("team//app/"), vec!["job", "team", "job", "app"]);
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client().endpoint(&["me", "api", "json"], &[]);
        assert_eq!(url.as_str(), "http://jenkins.example.com/me/api/json");
    }

    #[test]
    fn test_endpoint_respects_base_path() {
        let client = JenkinsClient::new("http://jenkins.example.com/jenkins/", "u", "t").unwrap();
        let url = client.endpoint(&["api", "json"], &[]);
        assert_eq!(url.as_str(), "http://jenkins.example.com/jenkins/api/json");
    }

    #[test]
    fn test_endpoint_percent_encodes_job_names() {
        let segments = job_segments("my app");
        let url = client().endpoint(&segments, &[]);
        assert_eq!(url.as_str(), "http://jenkins.example.com/job/my%20app");
    }

    #[test]
    fn test_endpoint_query_pairs() {
        let url = client().endpoint(&["api", "json"], &[("tree", "jobs[name,url,color]")]);
        assert!(url.as_str().contains("tree=jobs"));
    }

    #[test]
    fn test_new_rejects_unparseable_url() {
        assert!(JenkinsClient::new("not a url", "u", "t").is_err());
    }
}
