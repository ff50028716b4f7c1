//! Configuration types for dataset validation runs

use crate::error::{Result, VerifyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the quarantine directory created next to the dataset root
pub const DEFAULT_ERROR_DIR_NAME: &str = "error_directories";

/// Suffix appended to the dataset name to form the default report file name
pub const REPORT_FILE_SUFFIX: &str = "_bincheck_validation_errors.json";

/// Default upper bound on simultaneously running directory checks
pub const DEFAULT_MAX_WORKERS: usize = 48;

const MAX_WORKERS_LIMIT: usize = 1024;

/// Pixel thresholds used by the mask and difference checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckThresholds {
    /// Mask intensities strictly above this value count as masked
    pub mask_threshold: u8,
    /// Mean absolute source/target differences strictly above this value count as edited
    pub diff_threshold: f32,
    /// Minimum fraction of mask pixels that must coincide with edited pixels
    pub min_overlap_ratio: f64,
}

impl Default for CheckThresholds {
    fn default() -> Self {
        Self {
            mask_threshold: 10,
            diff_threshold: 30.0,
            min_overlap_ratio: 0.7,
        }
    }
}

/// Configuration for a dataset validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Directory whose immediate subdirectories are the samples
    pub root_path: PathBuf,

    /// Quarantine directory (None = `<parent-of-root>/error_directories`)
    pub error_dir_path: Option<PathBuf>,

    /// Maximum number of directory checks running at once
    pub max_workers: usize,

    /// File name suffixes of the quadruplet, in role order: source, target, mask, sketch
    pub suffixes: Vec<String>,

    /// Metadata file expected in every sample directory
    pub metadata_file: String,

    /// Key that must be present in the metadata object
    pub required_metadata_key: String,

    /// Pixel thresholds for the mask checks
    pub thresholds: CheckThresholds,

    /// Log progress every N completed directories
    pub progress_interval: usize,

    /// Dataset name used for the report file (None = root directory name)
    pub dataset_name: Option<String>,

    /// Report output path (None = `./<dataset_name>_bincheck_validation_errors.json`)
    pub report_path: Option<PathBuf>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::new(),
            error_dir_path: None,
            max_workers: DEFAULT_MAX_WORKERS,
            suffixes: ["_0", "_1", "_2", "_3"].iter().map(ToString::to_string).collect(),
            metadata_file: "prompt.json".to_string(),
            required_metadata_key: "edit".to_string(),
            thresholds: CheckThresholds::default(),
            progress_interval: 500,
            dataset_name: None,
            report_path: None,
        }
    }
}

impl ValidatorConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dataset_verify::ValidatorConfig;
    ///
    /// let config = ValidatorConfig::builder()
    ///     .root_path("/datasets/sketchy2pix/final")
    ///     .max_workers(16)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.dataset_name(), "final");
    /// ```
    #[must_use]
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The loaded configuration is
    /// not validated; callers apply overrides first and then call [`validate`](Self::validate).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::file_io_error("read config file", path, &e))?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Quarantine directory for failing samples
    #[must_use]
    pub fn error_dir(&self) -> PathBuf {
        if let Some(dir) = &self.error_dir_path {
            return dir.clone();
        }
        let parent = self
            .root_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        parent.join(DEFAULT_ERROR_DIR_NAME)
    }

    /// Dataset name, derived from the root directory when not configured
    #[must_use]
    pub fn dataset_name(&self) -> String {
        if let Some(name) = &self.dataset_name {
            return name.clone();
        }
        self.root_path
            .file_name()
            .map_or_else(|| "dataset".to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Path of the persisted error report
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.report_path.clone().unwrap_or_else(|| {
            PathBuf::from(".").join(format!("{}{}", self.dataset_name(), REPORT_FILE_SUFFIX))
        })
    }

    /// Validate all configuration parameters
    ///
    /// # Validation Rules
    ///
    /// - Root path must be set
    /// - Worker count: 1-1024
    /// - Exactly four distinct, non-empty suffixes
    /// - Overlap ratio: finite, 0.0-1.0
    /// - Progress interval: at least 1
    pub fn validate(&self) -> Result<()> {
        if self.root_path.as_os_str().is_empty() {
            return Err(VerifyError::invalid_config("Root path is empty"));
        }

        if self.max_workers == 0 || self.max_workers > MAX_WORKERS_LIMIT {
            return Err(VerifyError::config_value_error(
                "max_workers",
                self.max_workers,
                "1-1024",
                Some(DEFAULT_MAX_WORKERS),
            ));
        }

        if self.suffixes.len() != 4 {
            return Err(VerifyError::invalid_config(format!(
                "Expected 4 image suffixes (source, target, mask, sketch), got {}",
                self.suffixes.len()
            )));
        }
        for (i, suffix) in self.suffixes.iter().enumerate() {
            if suffix.is_empty() {
                return Err(VerifyError::invalid_config(format!("Suffix {} is empty", i)));
            }
            if self.suffixes.iter().skip(i + 1).any(|other| other == suffix) {
                return Err(VerifyError::invalid_config(format!(
                    "Duplicate image suffix: {}",
                    suffix
                )));
            }
        }

        if self.metadata_file.is_empty() || self.required_metadata_key.is_empty() {
            return Err(VerifyError::invalid_config(
                "Metadata file name and required key must be non-empty",
            ));
        }

        let ratio = self.thresholds.min_overlap_ratio;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(VerifyError::config_value_error(
                "min_overlap_ratio",
                ratio,
                "0.0-1.0",
                Some(CheckThresholds::default().min_overlap_ratio),
            ));
        }

        if !self.thresholds.diff_threshold.is_finite() {
            return Err(VerifyError::invalid_config("diff_threshold must be finite"));
        }

        if self.progress_interval == 0 {
            return Err(VerifyError::config_value_error(
                "progress_interval",
                0,
                ">= 1",
                Some(500),
            ));
        }

        Ok(())
    }
}

/// Builder for `ValidatorConfig`
#[derive(Debug, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from a file)
    #[must_use]
    pub fn from_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Set dataset root
    #[must_use]
    pub fn root_path<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.root_path = root.into();
        self
    }

    /// Set quarantine directory
    #[must_use]
    pub fn error_dir_path<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.error_dir_path = Some(dir.into());
        self
    }

    /// Set worker pool width
    #[must_use]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    /// Set quadruplet suffixes
    #[must_use]
    pub fn suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set pixel thresholds
    #[must_use]
    pub fn thresholds(mut self, thresholds: CheckThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Set progress logging interval
    #[must_use]
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.config.progress_interval = interval;
        self
    }

    /// Set dataset name
    #[must_use]
    pub fn dataset_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.dataset_name = Some(name.into());
        self
    }

    /// Set report output path
    #[must_use]
    pub fn report_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.report_path = Some(path.into());
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<ValidatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
