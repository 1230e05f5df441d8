//! Progress rendering for a running build
//!
//! The percentage comes from pipeline stage completion when the job
//! exposes stages, from elapsed time against the estimated duration
//! otherwise, and degrades to an indeterminate spinner when neither is
//! available.

use crate::jenkins::types::{StageInfo, StageStatus};
use indicatif::{ProgressBar, ProgressStyle};

/// Percentage derived from stage completion.
///
/// Only a `Success` stage counts as completed; a failed or aborted stage
/// stalls the number rather than inflating it. `None` when there are no
/// stages at all.
#[must_use]
pub fn stage_percent(stages: &[StageInfo]) -> Option<u32> {
    if stages.is_empty() {
        return None;
    }
    let completed = stages
        .iter()
        .filter(|s| s.status == StageStatus::Success)
        .count();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (100.0 * completed as f64 / stages.len() as f64).round() as u32;
    Some(percent)
}

/// Name of the first in-progress stage, if any.
#[must_use]
pub fn current_stage_label(stages: &[StageInfo]) -> Option<&str> {
    stages
        .iter()
        .find(|s| s.status == StageStatus::InProgress)
        .map(|s| s.name.as_str())
}

/// Duration-based fallback percentage, capped at 95 so a build that runs
/// past its estimate never shows as finished before it is. `None` when no
/// positive estimate is known.
#[must_use]
pub fn duration_percent(elapsed_ms: u64, estimated_ms: i64) -> Option<u32> {
    if estimated_ms <= 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (100.0 * elapsed_ms as f64 / estimated_ms as f64).round() as u32;
    Some(percent.min(95))
}

/// In-place terminal rendering: a fixed 50-character bar with percentage
/// and label, or a spinner while no percentage is known. Redraws on the
/// same line each tick.
pub struct ProgressRenderer {
    bar: ProgressBar,
    determinate: bool,
}

impl ProgressRenderer {
    /// Starts in the indeterminate state.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        Self {
            bar,
            determinate: false,
        }
    }

    /// Draws a known percentage with a label.
    pub fn set_percent(&mut self, percent: u32, label: &str) {
        if !self.determinate {
            self.bar.set_style(bar_style());
            self.bar.set_length(100);
            self.determinate = true;
        }
        self.bar.set_position(u64::from(percent.min(100)));
        self.bar.set_message(label.to_string());
    }

    /// Draws an indeterminate "running" tick with no numeric percentage.
    pub fn set_running(&mut self, label: &str) {
        if self.determinate {
            // The spinner template ignores the bar length, so it can stay.
            self.bar.set_style(spinner_style());
            self.determinate = false;
        }
        self.bar.set_message(label.to_string());
        self.bar.tick();
    }

    /// Clears the bar once the build has finished, so the terminal result
    /// line prints cleanly.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:50}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} running {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, status: StageStatus) -> StageInfo {
        StageInfo {
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn test_stage_percent_two_of_three() {
        let stages = vec![
            stage("Checkout", StageStatus::Success),
            stage("Build", StageStatus::Success),
            stage("Deploy", StageStatus::InProgress),
        ];
        assert_eq!(stage_percent(&stages), Some(67));
        assert_eq!(current_stage_label(&stages), Some("Deploy"));
    }

    #[test]
    fn test_stage_percent_failed_stage_does_not_count() {
        let stages = vec![
            stage("Checkout", StageStatus::Success),
            stage("Build", StageStatus::Failed),
            stage("Deploy", StageStatus::NotExecuted),
        ];
        assert_eq!(stage_percent(&stages), Some(33));
    }

    #[test]
    fn test_stage_percent_aborted_stage_does_not_count() {
        let stages = vec![
            stage("Build", StageStatus::Success),
            stage("Deploy", StageStatus::Aborted),
        ];
        assert_eq!(stage_percent(&stages), Some(50));
    }

    #[test]
    fn test_stage_percent_empty_is_none() {
        assert_eq!(stage_percent(&[]), None);
    }

    #[test]
    fn test_stage_percent_all_done() {
        let stages = vec![
            stage("Build", StageStatus::Success),
            stage("Deploy", StageStatus::Success),
        ];
        assert_eq!(stage_percent(&stages), Some(100));
        assert_eq!(current_stage_label(&stages), None);
    }

    #[test]
    fn test_duration_percent_midway() {
        assert_eq!(duration_percent(30_000, 60_000), Some(50));
    }

    #[test]
    fn test_duration_percent_capped_at_95() {
        assert_eq!(duration_percent(120_000, 100_000), Some(95));
        assert_eq!(duration_percent(96_000, 100_000), Some(95));
    }

    #[test]
    fn test_duration_percent_unknown_estimate_is_none() {
        assert_eq!(duration_percent(30_000, 0), None);
        assert_eq!(duration_percent(30_000, -1), None);
    }

    #[test]
    fn test_renderer_switches_modes_without_panicking() {
        let mut renderer = ProgressRenderer::new();
        renderer.set_running("#4");
        renderer.set_percent(40, "Build");
        renderer.set_running("#4");
        renderer.finish();
    }
}
