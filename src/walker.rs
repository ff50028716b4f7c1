//! Dataset walker: fans directory validation out over a bounded worker pool

use crate::checker::LOW_OVERLAP_MARKER;
use crate::config::ValidatorConfig;
use crate::directory::{DirectoryOutcome, DirectoryValidator};
use crate::error::Result;
use crate::report::ErrorReport;
use crate::services::{
    CompletionStats, ImageIOService, NoOpProgressReporter, ProgressReporter, QuarantineService,
    ValidationStage, WalkProgress,
};
use crate::tracing_config::spans;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use instant::Instant;
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use tracing::{error, info, Instrument};

/// Unit of work executed once per sample directory
///
/// Implementations borrow the directory name and return an owned outcome;
/// they must not share mutable state between calls.
pub trait DirectoryCheck: Send + Sync + 'static {
    fn check(&self, dir_name: &OsStr) -> DirectoryOutcome;
}

impl DirectoryCheck for DirectoryValidator {
    fn check(&self, dir_name: &OsStr) -> DirectoryOutcome {
        self.validate(dir_name)
    }
}

/// Aggregate result of a dataset walk
#[derive(Debug, Clone)]
pub struct WalkSummary {
    /// Errors of every rejected directory
    pub errors: ErrorReport,
    /// Image sets checked successfully across all directories
    pub total_checked: usize,
    /// Number of sample directories submitted
    pub directories: usize,
    /// Directories moved into quarantine
    pub quarantined: usize,
    /// Tasks that panicked or could not be joined
    pub failed_tasks: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl WalkSummary {
    /// Number of low-overlap errors in the report
    #[must_use]
    pub fn low_overlap_count(&self) -> usize {
        self.errors.count_matching(LOW_OVERLAP_MARKER)
    }

    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Validates every immediate subdirectory of the configured root
pub struct DatasetWalker {
    config: Arc<ValidatorConfig>,
    check: Arc<dyn DirectoryCheck>,
    reporter: Arc<dyn ProgressReporter>,
}

impl DatasetWalker {
    /// Create a walker using the standard [`DirectoryValidator`]
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let check = Arc::new(DirectoryValidator::new(&config));
        Ok(Self {
            config,
            check,
            reporter: Arc::new(NoOpProgressReporter),
        })
    }

    /// Create a walker running a custom per-directory check
    pub fn with_check(config: ValidatorConfig, check: Arc<dyn DirectoryCheck>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            check,
            reporter: Arc::new(NoOpProgressReporter),
        })
    }

    /// Attach a progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Names of the sample directories directly under the root, sorted
    pub fn list_sample_directories(&self) -> Result<Vec<OsString>> {
        ImageIOService::list_subdirectories(&self.config.root_path)
    }

    /// Validate all sample directories and aggregate their errors
    ///
    /// Directory checks run as blocking tasks, at most `max_workers` at a time,
    /// and are merged in completion order. A task that panics is logged and
    /// excluded from the totals; the walk continues.
    pub async fn walk(&self) -> Result<WalkSummary> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let root = &self.config.root_path;

        let directories = self.list_sample_directories().map_err(|e| {
            self.reporter.report_error(ValidationStage::Discovery, &e.to_string());
            e
        })?;
        let total = directories.len();
        info!("Number of directories: {}", total);

        QuarantineService::new(self.config.error_dir()).ensure_dir()?;

        let span = spans::walk(root, total);
        self.reporter.report_start(total);

        let interval = self.config.progress_interval;
        let mut errors = ErrorReport::new();
        let mut total_checked = 0;
        let mut quarantined = 0;
        let mut rejected = 0;
        let mut failed_tasks = 0;
        let mut completed = 0;

        let tasks = directories.into_iter().map(|dir_name| {
            let check = Arc::clone(&self.check);
            let display = dir_name.to_string_lossy().into_owned();
            let task = tokio::task::spawn_blocking(move || check.check(&dir_name));
            async move { (display, task.await) }
        });
        let mut results = stream::iter(tasks).buffer_unordered(self.config.max_workers);

        async {
            while let Some((dir_name, joined)) = results.next().await {
                completed += 1;
                match joined {
                    Ok(outcome) => {
                        if !outcome.errors.is_empty() {
                            rejected += 1;
                            if outcome.quarantined_to.is_none() {
                                self.reporter.report_error(
                                    ValidationStage::Quarantine,
                                    &format!("{} was rejected but not moved", dir_name),
                                );
                            }
                        }
                        if outcome.quarantined_to.is_some() {
                            quarantined += 1;
                        }
                        errors.merge(outcome.errors);
                        total_checked += outcome.checked;
                    },
                    Err(join_error) => {
                        failed_tasks += 1;
                        error!(directory = %dir_name, error = %join_error, "Error processing task");
                        self.reporter.report_error(
                            ValidationStage::DirectoryValidation,
                            &format!("Error processing {}: {}", dir_name, join_error),
                        );
                    },
                }

                if completed % interval == 0 {
                    info!("Processed {} of {} directories", completed, total);
                }
                self.reporter.report_progress(
                    WalkProgress::new(completed, total, dir_name, start_time)
                        .with_counts(rejected, failed_tasks),
                );
            }
        }
        .instrument(span)
        .await;

        info!("Total image sets checked: {}", total_checked);
        self.reporter.report_completion(CompletionStats {
            directories: total,
            total_checked,
            rejected,
            failed_tasks,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        });

        Ok(WalkSummary {
            errors,
            total_checked,
            directories: total,
            quarantined,
            failed_tasks,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
