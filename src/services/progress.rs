//! Progress reporting service
//!
//! This module separates progress reporting concerns from the validation
//! logic, allowing different frontends to implement their own progress handling.

use instant::Instant;

/// Stages of a dataset validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Listing sample directories under the root
    Discovery,
    /// Checking sample directories on the worker pool
    DirectoryValidation,
    /// Moving an invalid directory into quarantine
    Quarantine,
    /// Writing the error report
    ReportWriting,
    /// Run completed
    Completed,
}

impl ValidationStage {
    /// Get a human-readable description of the stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ValidationStage::Discovery => "Discovering sample directories",
            ValidationStage::DirectoryValidation => "Validating sample directories",
            ValidationStage::Quarantine => "Quarantining invalid directory",
            ValidationStage::ReportWriting => "Writing error report",
            ValidationStage::Completed => "Validation completed",
        }
    }
}

/// Progress of the directory fan-out
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Directories whose check has finished
    pub completed: usize,
    /// Directories submitted in total
    pub total: usize,
    /// Directories rejected (and quarantined) so far
    pub rejected: usize,
    /// Tasks that failed to produce a result
    pub failed_tasks: usize,
    /// Name of the directory that just completed
    pub current_directory: String,
    /// Elapsed time since the walk started (milliseconds)
    pub elapsed_ms: u64,
}

impl WalkProgress {
    #[must_use]
    pub fn new(completed: usize, total: usize, current_directory: String, start_time: Instant) -> Self {
        Self {
            completed,
            total,
            rejected: 0,
            failed_tasks: 0,
            current_directory,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    #[must_use]
    pub fn with_counts(mut self, rejected: usize, failed_tasks: usize) -> Self {
        self.rejected = rejected;
        self.failed_tasks = failed_tasks;
        self
    }

    /// Directories per second
    #[must_use]
    pub fn rate(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            self.completed as f64 / (self.elapsed_ms as f64 / 1000.0)
        }
    }

    /// Estimated seconds until all directories are done
    #[must_use]
    pub fn eta_seconds(&self) -> Option<u64> {
        let rate = self.rate();
        if rate > 0.0 {
            Some((self.total.saturating_sub(self.completed) as f64 / rate) as u64)
        } else {
            None
        }
    }
}

/// Final counts reported once the walk finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStats {
    pub directories: usize,
    pub total_checked: usize,
    pub rejected: usize,
    pub failed_tasks: usize,
    pub elapsed_ms: u64,
}

/// Trait for reporting progress during a validation run
pub trait ProgressReporter: Send + Sync {
    /// Called once the number of directories is known
    fn report_start(&self, total: usize) {
        let _ = total;
    }

    /// Called after every completed directory
    fn report_progress(&self, update: WalkProgress);

    /// Called once after the last directory completed
    fn report_completion(&self, stats: CompletionStats);

    /// Report an error at a given stage
    fn report_error(&self, stage: ValidationStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: WalkProgress) {
        // Intentionally empty - discards progress updates
    }

    fn report_completion(&self, _stats: CompletionStats) {
        // Intentionally empty - discards completion notification
    }

    fn report_error(&self, _stage: ValidationStage, _error: &str) {
        // Intentionally empty - discards error reports
    }
}

/// Console progress reporter that logs through `tracing`
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_start(&self, total: usize) {
        tracing::info!("Submitted {} directories for validation", total);
    }

    fn report_progress(&self, update: WalkProgress) {
        if self.verbose {
            tracing::debug!(
                completed = update.completed,
                total = update.total,
                rejected = update.rejected,
                rate = update.rate(),
                "Validated {}",
                update.current_directory
            );
        }
    }

    fn report_completion(&self, stats: CompletionStats) {
        tracing::info!(
            "✅ {}: {} directories in {}ms ({} rejected, {} failed tasks)",
            ValidationStage::Completed.description(),
            stats.directories,
            stats.elapsed_ms,
            stats.rejected,
            stats.failed_tasks
        );
    }

    fn report_error(&self, stage: ValidationStage, error: &str) {
        tracing::error!("❌ Error during {}: {}", stage.description(), error);
    }
}
