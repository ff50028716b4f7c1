//! Progress bar reporter for interactive runs

use crate::services::{CompletionStats, ProgressReporter, ValidationStage, WalkProgress};
use indicatif::{ProgressBar, ProgressStyle};

/// Renders the directory walk as an `indicatif` progress bar
pub(crate) struct IndicatifProgressReporter {
    bar: ProgressBar,
}

impl IndicatifProgressReporter {
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressReporter for IndicatifProgressReporter {
    fn report_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn report_progress(&self, update: WalkProgress) {
        self.bar.set_position(update.completed as u64);
        let eta = update
            .eta_seconds()
            .map_or_else(|| "ETA --".to_string(), |secs| format!("ETA {}s", secs));
        self.bar.set_message(format!(
            "{} rejected, {} failed, {}",
            update.rejected, update.failed_tasks, eta
        ));
    }

    fn report_completion(&self, stats: CompletionStats) {
        self.bar.finish_with_message(format!(
            "{}: {} checked, {} rejected in {}ms",
            ValidationStage::Completed.description(),
            stats.total_checked,
            stats.rejected,
            stats.elapsed_ms
        ));
    }

    fn report_error(&self, stage: ValidationStage, error: &str) {
        self.bar.suspend(|| {
            tracing::error!("❌ Error during {}: {}", stage.description(), error);
        });
    }
}
