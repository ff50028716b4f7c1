//! Relocation of failing sample directories into the quarantine area

use crate::error::{Result, VerifyError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Moves invalid sample directories into a quarantine directory
///
/// Entries are keyed by the original directory name. An existing entry with
/// the same name is deleted before the move, so the latest validation wins.
#[derive(Debug, Clone)]
pub struct QuarantineService {
    error_dir: PathBuf,
}

impl QuarantineService {
    pub fn new<P: Into<PathBuf>>(error_dir: P) -> Self {
        Self {
            error_dir: error_dir.into(),
        }
    }

    #[must_use]
    pub fn error_dir(&self) -> &Path {
        &self.error_dir
    }

    /// Create the quarantine directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.error_dir)
            .map_err(|e| VerifyError::file_io_error("create quarantine directory", &self.error_dir, &e))
    }

    /// Move `dir_path` to `<error_dir>/<name of dir_path>`, returning the new location
    pub fn relocate(&self, dir_path: &Path) -> Result<PathBuf> {
        let name = dir_path.file_name().ok_or_else(|| {
            VerifyError::quarantine(format!("Cannot quarantine path without a name: {}", dir_path.display()))
        })?;
        self.ensure_dir()?;
        let destination = self.error_dir.join(name);

        if std::fs::symlink_metadata(&destination).is_ok() {
            debug!(path = %destination.display(), "Removing existing quarantine entry");
            remove_entry(&destination)?;
        }

        if let Err(rename_err) = std::fs::rename(dir_path, &destination) {
            // Rename fails across filesystems; fall back to copy + delete
            warn!(
                source = %dir_path.display(),
                destination = %destination.display(),
                error = %rename_err,
                "Rename failed, copying directory instead"
            );
            copy_tree(dir_path, &destination)?;
            std::fs::remove_dir_all(dir_path)
                .map_err(|e| VerifyError::file_io_error("remove moved directory", dir_path, &e))?;
        }

        Ok(destination)
    }
}

fn remove_entry(path: &Path) -> Result<()> {
    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| VerifyError::file_io_error("inspect quarantine entry", path, &e))?;
    let outcome = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    outcome.map_err(|e| VerifyError::file_io_error("remove quarantine entry", path, &e))
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            VerifyError::file_io_error("walk directory", source, &std::io::Error::from(e))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| VerifyError::internal(e.to_string()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| VerifyError::file_io_error("create directory", &target, &e))?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| VerifyError::file_io_error("copy file", entry.path(), &e))?;
        }
    }
    Ok(())
}
