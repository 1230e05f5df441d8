//! jenky - a Jenkins CLI
//!
//! Authenticate against a Jenkins server, list and inspect jobs, trigger
//! builds with parameters, and follow a running build with streamed
//! console output or an in-place progress bar.
//!
//! ## Commands
//!
//! - `jenky list` - List all Jenkins jobs
//! - `jenky info <job>` - Show details for one job
//! - `jenky build <job|alias>` - Trigger a build, optionally following it
//! - `jenky init-config` - Write a starter config file
//! - `jenky completions` - Generate shell completions
//!
//! ## Configuration
//!
//! Credentials come from `--username`/`--token` or the `JENKINS_USERNAME`
//! and `JENKINS_TOKEN` environment variables; the server URL from
//! `JENKINS_URL` (default `http://localhost:8080`). Job aliases live in
//! `~/.jenky.yaml`:
//!
//! ```yaml
//! aliases:
//!   deploy-app:
//!     job_name: DEPLOY_my_application
//!     parameters:
//!       TASK: deploy
//!       GIT_SYMBOL: origin/master
//!     options:
//!       progress: true
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    // Initialize tracing for debugging
    if std::env::var("JENKY_DEBUG").is_ok() {
        tracing_subscriber::fmt::init();
    }

    // Run the CLI
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if std::env::var("JENKY_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
