//! Wire models for the Jenkins REST API
//!
//! Jenkins returns loosely-typed JSON: most fields can be absent and the
//! status vocabularies grow with plugins. Every optional field is an
//! `Option` and every enum carries a `#[serde(other)]` catch-all so an
//! unknown string never fails deserialization.

use serde::Deserialize;
use std::fmt;

/// One entry of the job list (`GET /api/json?tree=jobs[name,url,color]`).
#[derive(Debug, Clone, Deserialize)]
pub struct JobSummary {
    /// Job name.
    pub name: String,
    /// Absolute URL of the job on the server.
    pub url: String,
    /// Jenkins "ball color" encoding the last build status.
    #[serde(default)]
    pub color: Option<String>,
}

/// Envelope around the job list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobList {
    /// Jobs visible to the authenticated user.
    #[serde(default)]
    pub jobs: Vec<JobSummary>,
}

/// Reference to a build inside job info (`lastBuild`, `lastCompletedBuild`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BuildRef {
    /// Per-job incrementing build number.
    pub number: u64,
}

/// Detailed job information (`GET /job/<name>/api/json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    /// Free-text job description, often empty.
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute URL of the job.
    #[serde(default)]
    pub url: Option<String>,
    /// Whether the job can be triggered at all.
    #[serde(default)]
    pub buildable: bool,
    /// Whether a trigger is currently sitting in the queue.
    #[serde(default)]
    pub in_queue: bool,
    /// Newest build, running or not.
    #[serde(default)]
    pub last_build: Option<BuildRef>,
    /// Newest build that has finished.
    #[serde(default)]
    pub last_completed_build: Option<BuildRef>,
    /// Number the next build will get.
    #[serde(default)]
    pub next_build_number: Option<u64>,
}

/// Terminal result of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    /// Build finished successfully.
    Success,
    /// Build failed.
    Failure,
    /// Build finished but a post-build step (tests, usually) failed.
    Unstable,
    /// Build was aborted.
    Aborted,
    /// Build never ran.
    NotBuilt,
    /// Result string this client does not know.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Unstable => "UNSTABLE",
            Self::Aborted => "ABORTED",
            Self::NotBuilt => "NOT_BUILT",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Snapshot of one build (`GET /job/<name>/<number>/api/json`), re-fetched
/// on every poll tick and never persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Build number.
    pub number: u64,
    /// True while the build is still running.
    #[serde(default)]
    pub building: bool,
    /// Terminal result; absent while the build is running.
    #[serde(default)]
    pub result: Option<BuildResult>,
    /// Human-readable name, usually `#<number>`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Start time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: u64,
    /// Estimated duration in milliseconds; negative when Jenkins has no
    /// history to estimate from.
    #[serde(default)]
    pub estimated_duration: i64,
}

/// Status of one pipeline stage, in the wfapi vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// Stage completed successfully.
    Success,
    /// Stage is currently executing.
    InProgress,
    /// Stage failed.
    Failed,
    /// Stage was aborted.
    Aborted,
    /// Stage completed but marked the build unstable.
    Unstable,
    /// Stage was skipped.
    NotExecuted,
    /// Stage is waiting on an `input` step.
    PausedPendingInput,
    /// Status string this client does not know.
    #[serde(other)]
    Unknown,
}

/// One named phase of a pipeline build.
#[derive(Debug, Clone, Deserialize)]
pub struct StageInfo {
    /// Stage name as written in the pipeline.
    pub name: String,
    /// Current status.
    pub status: StageStatus,
}

/// Stage listing for one run (`GET /job/<name>/<number>/wfapi/describe`).
/// Only exists for pipeline jobs; freestyle jobs 404 on this endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowRun {
    /// Stages in execution order.
    #[serde(default)]
    pub stages: Vec<StageInfo>,
}

/// Identity returned by the liveness check (`GET /me/api/json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    /// Account id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name of the account.
    #[serde(default)]
    pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_list_deserializes() {
        let raw = r#"{"jobs":[{"name":"app","url":"http://j/job/app/","color":"blue"},{"name":"lib","url":"http://j/job/lib/"}]}"#;
        let list: JobList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.jobs.len(), 2);
        assert_eq!(list.jobs[0].color.as_deref(), Some("blue"));
        assert!(list.jobs[1].color.is_none());
    }

    #[test]
    fn test_job_info_missing_fields_default() {
        let info: JobInfo = serde_json::from_str("{}").unwrap();
        assert!(info.description.is_none());
        assert!(!info.buildable);
        assert!(info.last_build.is_none());
    }

    #[test]
    fn test_job_info_build_refs() {
        let raw = r#"{"buildable":true,"inQueue":true,"lastBuild":{"number":12},"lastCompletedBuild":{"number":11},"nextBuildNumber":13}"#;
        let info: JobInfo = serde_json::from_str(raw).unwrap();
        assert!(info.buildable);
        assert!(info.in_queue);
        assert_eq!(info.last_build.unwrap().number, 12);
        assert_eq!(info.last_completed_build.unwrap().number, 11);
        assert_eq!(info.next_build_number, Some(13));
    }

    #[test]
    fn test_build_info_running_has_no_result() {
        let raw = r##"{"number":7,"building":true,"displayName":"#7","timestamp":1700000000000,"estimatedDuration":60000}"##;
        let info: BuildInfo = serde_json::from_str(raw).unwrap();
        assert!(info.building);
        assert!(info.result.is_none());
        assert_eq!(info.display_name.as_deref(), Some("#7"));
        assert_eq!(info.estimated_duration, 60000);
    }

    #[test]
    fn test_build_result_parses_and_displays() {
        let raw = r#"{"number":7,"building":false,"result":"UNSTABLE"}"#;
        let info: BuildInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.result, Some(BuildResult::Unstable));
        assert_eq!(info.result.unwrap().to_string(), "UNSTABLE");
    }

    #[test]
    fn test_build_result_unknown_string_is_tolerated() {
        let raw = r#"{"number":7,"building":false,"result":"SOMETHING_NEW"}"#;
        let info: BuildInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.result, Some(BuildResult::Unknown));
        assert_eq!(info.result.unwrap().to_string(), "UNKNOWN");
    }

    #[test]
    fn test_workflow_run_stages() {
        let raw = r##"{"id":"12","name":"#12","stages":[{"id":"6","name":"Build","status":"SUCCESS"},{"name":"Deploy","status":"IN_PROGRESS"}]}"##;
        let run: WorkflowRun = serde_json::from_str(raw).unwrap();
        assert_eq!(run.stages.len(), 2);
        assert_eq!(run.stages[0].status, StageStatus::Success);
        assert_eq!(run.stages[1].status, StageStatus::InProgress);
    }

    #[test]
    fn test_stage_status_unknown_string_is_tolerated() {
        let stage: StageInfo =
            serde_json::from_str(r#"{"name":"Odd","status":"PLUGIN_SPECIFIC"}"#).unwrap();
        assert_eq!(stage.status, StageStatus::Unknown);
    }
}
