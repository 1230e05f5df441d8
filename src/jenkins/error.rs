//! Error types for the Jenkins client

use thiserror::Error;

/// Errors that can occur talking to a Jenkins server.
///
/// The client never prints or exits on these; callers decide whether a
/// failure is fatal (the startup liveness check) or gets printed and
/// swallowed (everything else).
#[derive(Debug, Error)]
pub enum JenkinsError {
    /// The request never got a usable response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Jenkins returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code from the server.
        status: reqwest::StatusCode,
        /// URL that was requested.
        url: String,
    },

    /// The server URL could not be parsed.
    #[error("invalid Jenkins URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server URL cannot carry path segments.
    #[error("invalid Jenkins URL: {0}")]
    BadBase(String),

    /// The response body was not the JSON this client expects.
    #[error("could not decode Jenkins response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl JenkinsError {
    /// True for an HTTP 404, which some endpoints (wfapi on a freestyle
    /// job) return as a normal answer rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status { status, .. } if *status == reqwest::StatusCode::NOT_FOUND
        )
    }
}
