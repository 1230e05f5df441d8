//! Prelude module for common imports

pub use crate::config::{AliasOptions, CliConfig, ConfigError, ConfigStore, JobAlias};
pub use crate::jenkins::client::JenkinsClient;
pub use crate::jenkins::error::JenkinsError;
pub use crate::jenkins::types::{
    BuildInfo, BuildRef, BuildResult, JobInfo, JobSummary, StageInfo, StageStatus, WhoAmI,
};
pub use crate::orchestrator::progress::{
    ProgressRenderer, current_stage_label, duration_percent, stage_percent,
};
pub use crate::orchestrator::{BuildRequest, run_build};
