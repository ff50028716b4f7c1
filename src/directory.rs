//! Validation of a single sample directory

use crate::checker::ImageSetChecker;
use crate::config::ValidatorConfig;
use crate::error::VerifyError;
use crate::report::ErrorMap;
use crate::services::{ImageIOService, QuarantineService};
use crate::tracing_config::spans;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const SET_MARKER: &str = "_0.png";

/// Result of validating one sample directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryOutcome {
    /// Errors keyed by directory path; empty when the directory is valid
    pub errors: ErrorMap,
    /// Number of image sets checked successfully
    pub checked: usize,
    /// Where the directory was moved, if it was quarantined
    pub quarantined_to: Option<PathBuf>,
}

/// Why a directory as a whole was rejected
#[derive(Error, Debug)]
enum DirectoryFailure {
    #[error("Directory size check failed: {0:?}")]
    SizeCheck(Vec<String>),

    #[error("Image set check failed: {0:?}")]
    ImageSet(Vec<String>),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Validates sample directories under one dataset root and quarantines failures
#[derive(Debug, Clone)]
pub struct DirectoryValidator {
    root: PathBuf,
    checker: ImageSetChecker,
    quarantine: QuarantineService,
}

impl DirectoryValidator {
    #[must_use]
    pub fn new(config: &Arc<ValidatorConfig>) -> Self {
        Self {
            root: config.root_path.clone(),
            checker: ImageSetChecker::new(config),
            quarantine: QuarantineService::new(config.error_dir()),
        }
    }

    /// Validate `<root>/<dir_name>`
    ///
    /// Never fails: any problem is recorded under the directory path in the
    /// returned outcome and the directory is moved to quarantine.
    pub fn validate(&self, dir_name: &OsStr) -> DirectoryOutcome {
        let dir_path = self.root.join(dir_name);
        let _span = spans::directory(&dir_path).entered();

        if !dir_path.is_dir() {
            info!(directory = %dir_path.display(), "Directory does not exist");
            return DirectoryOutcome::default();
        }

        match self.check_directory(&dir_path) {
            Ok(checked) => DirectoryOutcome {
                checked,
                ..DirectoryOutcome::default()
            },
            Err(failure) => {
                debug!(directory = %dir_path.display(), reason = %failure, "Directory rejected");
                let quarantined_to = match self.quarantine.relocate(&dir_path) {
                    Ok(destination) => {
                        warn!(
                            directory = %dir_path.display(),
                            destination = %destination.display(),
                            "Quarantined invalid directory"
                        );
                        Some(destination)
                    },
                    Err(e) => {
                        error!(directory = %dir_path.display(), error = %e, "Failed to move directory");
                        None
                    },
                };

                let mut errors = BTreeMap::new();
                errors.insert(
                    dir_path.display().to_string(),
                    vec![format!("Directory processing error: {}", failure)],
                );
                DirectoryOutcome {
                    errors,
                    checked: 0,
                    quarantined_to,
                }
            },
        }
    }

    fn check_directory(&self, dir_path: &Path) -> Result<usize, DirectoryFailure> {
        let size_errors = Self::check_directory_image_sizes(dir_path)?;
        if !size_errors.is_empty() {
            return Err(DirectoryFailure::SizeCheck(size_errors));
        }

        let mut checked = 0;
        for set_file in ImageIOService::list_files_with_suffix(dir_path, SET_MARKER)? {
            let base = strip_set_marker(&set_file);
            let errors = self.checker.check(&base).map_err(VerifyError::from)?;
            if !errors.is_empty() {
                return Err(DirectoryFailure::ImageSet(errors));
            }
            checked += 1;
        }
        Ok(checked)
    }

    /// Check that every PNG directly inside `dir_path` has the same dimensions
    fn check_directory_image_sizes(dir_path: &Path) -> Result<Vec<String>, VerifyError> {
        let mut errors = Vec::new();
        let mut sizes: BTreeMap<String, (u32, u32)> = BTreeMap::new();

        for png in ImageIOService::list_files_with_suffix(dir_path, ".png")? {
            let file = png
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match ImageIOService::read_dimensions(&png) {
                Ok(size) => {
                    sizes.insert(file, size);
                },
                Err(e) => errors.push(format!("Error loading {}: {}", file, e)),
            }
        }

        let mut distinct: Vec<(u32, u32)> = sizes.values().copied().collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() > 1 {
            let listed: Vec<String> = sizes
                .iter()
                .map(|(file, (w, h))| format!("'{}': ({}, {})", file, w, h))
                .collect();
            errors.push(format!(
                "Inconsistent image sizes in directory: {{{}}}",
                listed.join(", ")
            ));
        }

        Ok(errors)
    }
}

/// `<dir>/<id>_0.png` -> `<dir>/<id>`
fn strip_set_marker(set_file: &Path) -> PathBuf {
    let name = set_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(SET_MARKER).unwrap_or(&name);
    set_file.with_file_name(stem)
}
