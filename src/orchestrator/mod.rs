//! Build orchestration
//!
//! Resolves a build request from CLI input merged over alias defaults,
//! triggers the build, and when asked follows it through the poll loop:
//! `TRIGGERED → WAITING_FOR_START → {STREAMING | PROGRESS | SILENT} →
//! FINISHED`. The loop only ends when the remote build reports that it is
//! no longer building; transient fetch failures degrade one tick and the
//! loop continues.

pub mod progress;

use crate::config::JobAlias;
use crate::jenkins::types::BuildInfo;
use crate::jenkins::{JenkinsClient, JenkinsError};
use progress::{ProgressRenderer, current_stage_label, duration_percent, stage_percent};
use std::collections::BTreeMap;
use std::io::Write as _;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Delay between attempts while waiting for the build number to appear.
/// The trigger-to-start window is usually short; half a second keeps the
/// wait responsive without hammering the server.
const START_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Attempts before giving up on a build that never leaves the queue.
const START_POLL_ATTEMPTS: u32 = 240;

/// Fixed interval between polls once the build is running.
const TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Fully-resolved request for one `build` invocation. Ephemeral; built
/// fresh from CLI arguments and an optional alias every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    /// Real job name to trigger.
    pub job_name: String,
    /// Effective build parameters.
    pub parameters: BTreeMap<String, String>,
    /// Stream console output while the build runs.
    pub stream: bool,
    /// Render a progress bar while the build runs.
    pub progress: bool,
}

impl BuildRequest {
    /// Merges CLI input over an optional alias.
    ///
    /// Alias parameters are the base and CLI parameters overwrite per key;
    /// no key is dropped from either side. Options are OR-merged: a CLI
    /// flag can only enable a display mode, never disable an alias
    /// default. Without an alias the name is taken as a literal job name.
    #[must_use]
    pub fn resolve(
        name: &str,
        cli_parameters: BTreeMap<String, String>,
        stream: bool,
        progress: bool,
        alias: Option<&JobAlias>,
    ) -> Self {
        match alias {
            Some(alias) => {
                let mut parameters = alias.parameters.clone();
                parameters.extend(cli_parameters);
                Self {
                    job_name: alias.job_name.clone(),
                    parameters,
                    stream: stream || alias.options.stream,
                    progress: progress || alias.options.progress,
                }
            }
            None => Self {
                job_name: name.to_string(),
                parameters: cli_parameters,
                stream,
                progress,
            },
        }
    }

    /// True when the build should be followed after triggering.
    #[must_use]
    pub fn follows(&self) -> bool {
        self.stream || self.progress
    }
}

/// Triggers the build and, when streaming or progress is requested,
/// follows it to completion.
///
/// Errors before the poll loop (job lookup, trigger) propagate to the
/// caller; errors inside the loop only degrade that tick.
pub fn run_build(client: &JenkinsClient, request: &BuildRequest) -> Result<(), JenkinsError> {
    let before = client.job_info(&request.job_name)?;
    let last_completed = before.last_completed_build.map_or(0, |b| b.number);

    client.build_job(&request.job_name, &request.parameters)?;
    println!(
        "Successfully triggered build for job: {}",
        request.job_name
    );

    if !request.follows() {
        return Ok(());
    }

    let Some(number) = wait_for_start(client, &request.job_name, last_completed) else {
        println!("Build did not start in time; not following it.");
        return Ok(());
    };
    tracing::info!(job = %request.job_name, build = number, "build started");

    follow_build(client, request, number);
    Ok(())
}

/// WAITING_FOR_START: polls job info until a build newer than
/// `last_completed` shows up, sleeping between attempts. Returns the new
/// build number, or `None` when the wait window runs out.
fn wait_for_start(client: &JenkinsClient, job: &str, last_completed: u64) -> Option<u64> {
    for attempt in 0..START_POLL_ATTEMPTS {
        if attempt > 0 {
            thread::sleep(START_POLL_INTERVAL);
        }
        match client.job_info(job) {
            Ok(info) => {
                if let Some(last) = info.last_build {
                    if last.number > last_completed {
                        return Some(last.number);
                    }
                }
            }
            Err(e) => tracing::debug!(job, error = %e, "job info poll failed"),
        }
    }
    None
}

/// Active phase: one fixed-interval tick fetches build info, then renders
/// progress and/or streams console output until the build stops building.
fn follow_build(client: &JenkinsClient, request: &BuildRequest, number: u64) {
    let job = &request.job_name;
    let mut renderer = request.progress.then(ProgressRenderer::new);
    let mut console_offset = 0u64;

    loop {
        let info = match client.build_info(job, number) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!(job, build = number, error = %e, "build info poll failed");
                None
            }
        };

        if let Some(info) = &info {
            if !info.building {
                if let Some(renderer) = &renderer {
                    renderer.finish();
                }
                if request.stream {
                    // Drain whatever the log gained since the last tick.
                    stream_console(client, job, number, &mut console_offset);
                }
                let result = info
                    .result
                    .map_or_else(|| "UNKNOWN".to_string(), |r| r.to_string());
                println!("Build #{number} finished: {result}");
                return;
            }
        }

        if let (Some(renderer), Some(info)) = (&mut renderer, &info) {
            render_tick(client, renderer, job, number, info);
        }

        if request.stream {
            stream_console(client, job, number, &mut console_offset);
        }

        thread::sleep(TICK_INTERVAL);
    }
}

/// One progress frame: stage-based percentage when the job has stages,
/// duration-based fallback otherwise, spinner when neither is known.
/// A stage fetch failure degrades to the fallback for this tick only.
fn render_tick(
    client: &JenkinsClient,
    renderer: &mut ProgressRenderer,
    job: &str,
    number: u64,
    info: &BuildInfo,
) {
    let stages = match client.stages(job, number) {
        Ok(stages) => stages,
        Err(e) => {
            tracing::debug!(job, build = number, error = %e, "stage poll failed");
            Vec::new()
        }
    };

    let display_name = info.display_name.as_deref().unwrap_or("");

    if let Some(percent) = stage_percent(&stages) {
        let label = current_stage_label(&stages).unwrap_or(display_name);
        renderer.set_percent(percent, label);
        return;
    }

    if let Some(percent) = duration_percent(elapsed_ms(info.timestamp), info.estimated_duration) {
        renderer.set_percent(percent, display_name);
        return;
    }

    renderer.set_running(display_name);
}

/// Prints console output produced since the last call and advances the
/// byte offset, so each tick only transfers the new suffix.
fn stream_console(client: &JenkinsClient, job: &str, number: u64, offset: &mut u64) {
    match client.console_output(job, number, *offset) {
        Ok((chunk, next)) => {
            if !chunk.is_empty() {
                print!("{chunk}");
                let _ = std::io::stdout().flush();
            }
            *offset = next;
        }
        Err(e) => tracing::debug!(job, build = number, error = %e, "console poll failed"),
    }
}

/// Milliseconds elapsed since the build's start timestamp.
fn elapsed_ms(timestamp_ms: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    #[allow(clippy::cast_possible_truncation)]
    let now_ms = now.as_millis() as u64;
    now_ms.saturating_sub(timestamp_ms)
}
