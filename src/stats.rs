//! Dataset statistics derived from persisted error reports

use crate::error::{Result, VerifyError};
use crate::report::ErrorReport;
use crate::services::ImageIOService;
use crate::tracing_config::spans;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Valid/invalid datapoint counts for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStats {
    pub dataset_name: String,
    pub invalid: usize,
    pub total: usize,
}

impl DatasetStats {
    /// Compute statistics from a report file named `<dataset>_....json`
    ///
    /// The total is the number of sample directories currently under the
    /// dataset directory, located through the first reported path. An empty
    /// report yields zero totals.
    pub fn from_report_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let _span = spans::statistics(path).entered();

        let dataset_name = dataset_name_from_report_path(path).ok_or_else(|| {
            VerifyError::report(format!("Cannot derive dataset name from {}", path.display()))
        })?;
        let report = ErrorReport::load(path)?;
        Self::from_report(&report, dataset_name)
    }

    /// Compute statistics for `dataset_name` from an in-memory report
    pub fn from_report(report: &ErrorReport, dataset_name: String) -> Result<Self> {
        let invalid = report.len();
        let total = match report.first_key() {
            Some(first_key) => {
                let base_dir = dataset_base_dir(first_key, &dataset_name).ok_or_else(|| {
                    VerifyError::report(format!(
                        "Reported path {} does not contain dataset name {}",
                        first_key, dataset_name
                    ))
                })?;
                ImageIOService::list_subdirectories(&base_dir)?.len()
            },
            None => 0,
        };

        Ok(Self {
            dataset_name,
            invalid,
            total,
        })
    }

    #[must_use]
    pub fn valid(&self) -> usize {
        self.total.saturating_sub(self.invalid)
    }

    /// Percentage of valid datapoints, 0 for an empty dataset
    #[must_use]
    pub fn validity_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid() as f64 / self.total as f64 * 100.0
        }
    }
}

/// `final_bincheck_validation_errors.json` -> `final`
#[must_use]
pub fn dataset_name_from_report_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    let name = file_name.split('_').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Truncate a reported path right after the first occurrence of the dataset name
#[must_use]
pub fn dataset_base_dir(reported_path: &str, dataset_name: &str) -> Option<PathBuf> {
    let idx = reported_path.find(dataset_name)?;
    reported_path.get(..idx + dataset_name.len()).map(PathBuf::from)
}

/// Compute statistics for every existing report, skipping missing files
pub fn collect_stats<P: AsRef<Path>>(reports: &[P]) -> Result<Vec<DatasetStats>> {
    let mut all = Vec::with_capacity(reports.len());
    for report in reports {
        let report = report.as_ref();
        if !report.exists() {
            warn!(report = %report.display(), "Report file not found, skipping");
            continue;
        }
        all.push(DatasetStats::from_report_file(report)?);
    }
    Ok(all)
}

/// Render the plain-text statistics summary
#[must_use]
pub fn render_summary(stats: &[DatasetStats]) -> String {
    let mut out = String::from("Dataset Statistics Summary\n=======================\n\n");
    for s in stats {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "{name} Dataset:\n  Invalid datapoints: {invalid}\n  Total datapoints: {total}\n  Valid datapoints: {valid}\n  Validity percentage: {pct:.2}%\n\n",
            name = s.dataset_name,
            invalid = s.invalid,
            total = s.total,
            valid = s.valid(),
            pct = s.validity_percentage(),
        );
    }
    out
}

/// Write the statistics summary to `path`
pub fn write_summary<P: AsRef<Path>>(path: P, stats: &[DatasetStats]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_summary(stats))
        .map_err(|e| VerifyError::file_io_error("write statistics", path, &e))
}
