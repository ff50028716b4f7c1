//! Image I/O operations service
//!
//! This module keeps file access for the checks in one place so the
//! validation logic only deals with decoded images and dimensions.

use crate::error::{Result, VerifyError};
use image::DynamicImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Service for reading dataset images and listing directory contents
pub struct ImageIOService;

impl ImageIOService {
    /// Read the pixel dimensions of an image without decoding its pixels
    ///
    /// # Returns
    /// * `Ok((width, height))` - Header decoded successfully
    /// * `Err(VerifyError)` - File missing, unreadable or not a known image format
    pub fn read_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
        let path_ref = path.as_ref();
        image::ImageReader::open(path_ref)
            .map_err(|e| VerifyError::file_io_error("open image", path_ref, &e))?
            .with_guessed_format()
            .map_err(|e| VerifyError::file_io_error("read image header", path_ref, &e))?
            .into_dimensions()
            .map_err(VerifyError::Image)
    }

    /// Load and fully decode an image
    ///
    /// Extension-based format detection is tried first; on failure the file
    /// content is sniffed instead.
    pub fn load_image<P: AsRef<Path>>(path: P) -> std::result::Result<DynamicImage, image::ImageError> {
        let path_ref = path.as_ref();

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                tracing::debug!(
                    path = %path_ref.display(),
                    error = %e,
                    "Extension-based loading failed, attempting content-based detection"
                );
                let data = std::fs::read(path_ref).map_err(image::ImageError::IoError)?;
                image::load_from_memory(&data).map_err(|_| e)
            },
        }
    }

    /// List the names of the immediate subdirectories of `root`, sorted
    pub fn list_subdirectories<P: AsRef<Path>>(root: P) -> Result<Vec<OsString>> {
        let root = root.as_ref();
        let mut names = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                VerifyError::file_io_error("list directory", root, &std::io::Error::from(e))
            })?;
            // Follows symlinks; dangling links are skipped
            if entry.path().is_dir() {
                names.push(entry.file_name().to_os_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// List files directly inside `dir` (symlinks followed) whose name ends with `suffix`, sorted
    pub fn list_files_with_suffix<P: AsRef<Path>>(dir: P, suffix: &str) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                VerifyError::file_io_error("list directory", dir, &std::io::Error::from(e))
            })?;
            if !entry.path().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(suffix) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
