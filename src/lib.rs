#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

//! # Dataset Verify
//!
//! Offline validator for image-editing training datasets. Every sample directory
//! holds image quadruplets (`<id>_0.png` source, `<id>_1.png` target, `<id>_2.png`
//! mask, `<id>_3.png` sketch) plus a `prompt.json` metadata file. Samples that
//! fail validation are moved into a quarantine directory and their errors are
//! collected into a JSON report.
//!
//! ## Features
//!
//! - **Structural checks**: file presence, size agreement, metadata key
//! - **Pixel checks**: mask/difference overlap ratio, sketch binarization
//! - **Parallel walk**: bounded worker pool over sample directories, panics isolated per task
//! - **Quarantine**: failing directories are moved next to the dataset root
//! - **Statistics**: valid/invalid counts derived from persisted reports
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataset_verify::{validate_dataset, ValidatorConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ValidatorConfig::builder()
//!     .root_path("/datasets/sketchy2pix/final")
//!     .max_workers(32)
//!     .build()?;
//!
//! let summary = validate_dataset(config.clone()).await?;
//! summary.errors.save(config.report_path())?;
//! println!("{} image sets checked", summary.total_checked);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface and progress bar
//! - `tracing-json`: JSON structured log output
//! - `tracing-files`: Log output to a file
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! dataset-verify = { version = "0.1", default-features = false }
//! ```

pub mod analysis;
pub mod checker;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod report;
pub mod services;
pub mod stats;
pub mod tracing_config;
pub mod walker;

// Public API exports
pub use checker::{ImageSetChecker, LOW_OVERLAP_MARKER};
pub use config::{CheckThresholds, ValidatorConfig, ValidatorConfigBuilder};
pub use directory::{DirectoryOutcome, DirectoryValidator};
pub use error::{FatalCheckError, FatalCheckKind, Result, VerifyError};
pub use report::{ErrorMap, ErrorReport};
pub use services::{
    CompletionStats, ConsoleProgressReporter, ImageIOService, NoOpProgressReporter,
    ProgressReporter, QuarantineService, ValidationStage, WalkProgress,
};
pub use stats::{collect_stats, render_summary, write_summary, DatasetStats};
pub use tracing_config::{events, spans, TracingConfig, TracingFormat, TracingOutput};
pub use walker::{DatasetWalker, DirectoryCheck, WalkSummary};

/// Validate every sample directory under `config.root_path`
///
/// Failing directories are moved into the quarantine directory as a side effect.
/// The returned summary carries the aggregated error report; persisting it is
/// left to the caller.
///
/// # Examples
///
/// ```rust,no_run
/// use dataset_verify::{validate_dataset, ValidatorConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ValidatorConfig::builder()
///     .root_path("/datasets/sketchy2pix/final")
///     .build()?;
/// let summary = validate_dataset(config).await?;
/// println!("{} directories rejected", summary.errors.len());
/// # Ok(())
/// # }
/// ```
pub async fn validate_dataset(config: ValidatorConfig) -> Result<WalkSummary> {
    DatasetWalker::new(config)?.walk().await
}
