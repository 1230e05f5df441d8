//! # Jenky - a Jenkins CLI in Rust
//!
//! Jenky authenticates against a Jenkins automation server, lists and
//! inspects jobs, triggers builds with parameters, and optionally follows
//! a triggered build with streamed console output or an in-place progress
//! bar. Job aliases with default parameters and options live in a
//! per-user YAML config file.
//!
//! ## Quick Start
//!
//! ```bash
//! export JENKINS_URL=https://jenkins.example.com
//! export JENKINS_USERNAME=me
//! export JENKINS_TOKEN=secret
//!
//! jenky list
//! jenky info my-job
//! jenky build my-job --parameters '{"BRANCH":"main"}' --progress
//! jenky init-config
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod jenkins;
pub mod orchestrator;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use config::{AliasOptions, CliConfig, ConfigError, ConfigStore, JobAlias};
pub use jenkins::{JenkinsClient, JenkinsError};
pub use orchestrator::{BuildRequest, run_build};

/// Version of the jenky crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
