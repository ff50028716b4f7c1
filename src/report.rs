//! Aggregated error report persisted at the end of a run

use crate::error::{Result, VerifyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors keyed by sample directory or image-set base path
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Error report accumulated across all directory checks
///
/// Serializes as a plain JSON object `{ "<path>": ["<error>", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorReport {
    entries: ErrorMap,
}

impl ErrorReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another map into the report; colliding keys are overwritten
    pub fn merge(&mut self, errors: ErrorMap) {
        self.entries.extend(errors);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &ErrorMap {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn first_key(&self) -> Option<&str> {
        self.entries.keys().next().map(String::as_str)
    }

    /// Number of individual error strings containing `needle`
    #[must_use]
    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|error| error.contains(needle))
            .count()
    }

    /// Write the report as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| VerifyError::file_io_error("create report directory", parent, &e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| VerifyError::file_io_error("write report", path, &e))
    }

    /// Read a report previously written by [`save`](Self::save)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::file_io_error("read report", path, &e))?;
        serde_json::from_str(&content)
            .map_err(|e| VerifyError::report(format!("Malformed report {}: {}", path.display(), e)))
    }
}

impl From<ErrorMap> for ErrorReport {
    fn from(entries: ErrorMap) -> Self {
        Self { entries }
    }
}
