//! Dataset validation CLI
//!
//! Command-line interface that validates a dataset root, writes the error report
//! and optionally summarizes existing reports.

use super::config::CliConfigBuilder;
use super::progress::IndicatifProgressReporter;
use crate::{
    stats::{collect_stats, write_summary},
    tracing_config::{events, TracingConfig, TracingFormat},
    walker::{DatasetWalker, WalkSummary},
    ConsoleProgressReporter, ProgressReporter, ValidationStage,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Validate image-editing datasets and quarantine broken samples
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "dataset-verify")]
pub struct Cli {
    /// Dataset root whose subdirectories are validated
    #[arg(value_name = "ROOT", required_unless_present_any = &["config", "stats"])]
    pub root: Option<PathBuf>,

    /// Quarantine directory [default: <parent of ROOT>/error_directories]
    #[arg(long, value_name = "DIR")]
    pub error_dir: Option<PathBuf>,

    /// Maximum number of directories validated concurrently [default: 48]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Dataset name used in the report file name [default: ROOT's last component]
    #[arg(long)]
    pub dataset_name: Option<String>,

    /// Report output path [default: ./<NAME>_bincheck_validation_errors.json]
    #[arg(short, long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log a progress line every N completed directories [default: 500]
    #[arg(long, value_name = "N")]
    pub progress_interval: Option<usize>,

    /// Compute dataset statistics from existing reports and exit
    #[arg(long, value_name = "REPORT", num_args = 1..)]
    pub stats: Vec<PathBuf>,

    /// Statistics summary output file
    #[arg(long, value_name = "FILE", default_value = "dataset-stats.txt")]
    pub stats_output: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Tracing filter directive, e.g. "dataset_verify=debug" (overrides -v)
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Write logs to FILE instead of stderr
    #[cfg(feature = "tracing-files")]
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

/// Tracing setup requested on the command line
pub(crate) fn tracing_config_from_cli(cli: &Cli) -> TracingConfig {
    let mut config = TracingConfig::new()
        .with_verbosity(cli.verbose)
        .with_format(cli.log_format.into());
    if let Some(filter) = &cli.log_filter {
        config = config.with_env_filter(filter.as_str());
    }
    #[cfg(feature = "tracing-files")]
    if let Some(path) = &cli.log_file {
        config = config.with_output(crate::TracingOutput::File(path.clone()));
    }
    config
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_config_from_cli(&cli)
        .with_session_id(uuid::Uuid::new_v4().to_string())
        .init()
        .context("Failed to initialize tracing")?;

    run(cli).await
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    if !cli.stats.is_empty() {
        return write_statistics(&cli.stats, &cli.stats_output);
    }

    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;
    let root = config.root_path.clone();
    let report_path = config.report_path();

    info!("Path exists: {}", root.exists());

    let error_dir = config.error_dir();
    std::fs::create_dir_all(&error_dir).with_context(|| {
        format!("Failed to create quarantine directory: {}", error_dir.display())
    })?;
    info!("Error directory: {}", error_dir.display());
    log_permissions("Root dir", &root);
    log_permissions("Error dir", &error_dir);

    let reporter: Arc<dyn ProgressReporter> = if cli.no_progress {
        Arc::new(ConsoleProgressReporter::new(cli.verbose > 0))
    } else {
        Arc::new(IndicatifProgressReporter::new())
    };

    events::progress(&format!("Validating {}", root.display()), "🔍");
    let walker = DatasetWalker::new(config)
        .context("Invalid configuration")?
        .with_reporter(Arc::clone(&reporter));
    let summary = match walker.walk().await {
        Ok(summary) => summary,
        Err(e) => {
            events::error_with_context(&e, "dataset walk");
            return Err(e).context(format!("Failed to validate {}", root.display()));
        },
    };

    if let Err(e) = summary.errors.save(&report_path) {
        reporter.report_error(ValidationStage::ReportWriting, &e.to_string());
        return Err(e).with_context(|| format!("Failed to save report: {}", report_path.display()));
    }
    info!("Errors saved to {}", report_path.display());

    log_summary(&summary);
    Ok(())
}

fn write_statistics(reports: &[PathBuf], output: &Path) -> Result<()> {
    let stats = collect_stats(reports).context("Failed to compute dataset statistics")?;
    if stats.is_empty() {
        events::warning_with_recommendation(
            "None of the given report files exist",
            "Run a validation first or check the report paths",
        );
    }
    write_summary(output, &stats)
        .with_context(|| format!("Failed to write statistics: {}", output.display()))?;

    for s in &stats {
        info!(
            "{}: {} of {} datapoints valid ({:.2}%)",
            s.dataset_name,
            s.valid(),
            s.total,
            s.validity_percentage()
        );
    }
    info!("Statistics written to {}", output.display());
    Ok(())
}

fn log_summary(summary: &WalkSummary) {
    info!("Validation completed in {}s", summary.elapsed().num_seconds());
    info!("Total image sets checked: {}", summary.total_checked);
    info!("Total directories with errors: {}", summary.errors.len());
    info!("Low overlap errors: {}", summary.low_overlap_count());
    info!("Directories quarantined: {}", summary.quarantined);
    if summary.failed_tasks > 0 {
        events::warning_with_recommendation(
            &format!("{} directory tasks failed", summary.failed_tasks),
            "Re-run with -v to see which directories crashed the checker",
        );
    }
}

#[cfg(unix)]
fn log_permissions(label: &str, path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => info!("{} permissions: {:o}", label, meta.permissions().mode() & 0o777),
        Err(e) => events::warning_with_recommendation(
            &format!("Cannot read {} metadata: {}", path.display(), e),
            "Check that the path exists and is readable",
        ),
    }
}

#[cfg(not(unix))]
fn log_permissions(_label: &str, _path: &Path) {}
