//! Error types for dataset validation operations

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Result type alias for dataset validation operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Error types for dataset validation operations
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON parsing or serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error report persistence or parsing errors
    #[error("Report error: {0}")]
    Report(String),

    /// Failure relocating a directory into quarantine
    #[error("Quarantine error: {0}")]
    Quarantine(String),

    /// A sample check that cannot continue
    #[error(transparent)]
    FatalCheck(#[from] FatalCheckError),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VerifyError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new report error
    pub fn report<S: Into<String>>(msg: S) -> Self {
        Self::Report(msg.into())
    }

    /// Create a new quarantine error
    pub fn quarantine<S: Into<String>>(msg: S) -> Self {
        Self::Quarantine(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }
}

/// Kinds of per-sample conditions that make further checking meaningless
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalCheckKind {
    /// The binarized mask has no set pixels
    EmptyMask,
    /// The mask uses a sample type other than 1-bit or 8-bit
    UnsupportedMaskType,
    /// Source, target and mask arrays cannot be combined element-wise
    ShapeMismatch,
    /// A quadruplet image failed to decode during pixel analysis
    ImageDecode,
}

impl fmt::Display for FatalCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMask => write!(f, "empty mask"),
            Self::UnsupportedMaskType => write!(f, "unsupported mask type"),
            Self::ShapeMismatch => write!(f, "shape mismatch"),
            Self::ImageDecode => write!(f, "image decode"),
        }
    }
}

/// Fatal outcome of a single sample check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct FatalCheckError {
    pub kind: FatalCheckKind,
    pub detail: String,
}

impl FatalCheckError {
    pub fn new<S: Into<String>>(kind: FatalCheckKind, detail: S) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn empty_mask<P: AsRef<Path>>(base: P) -> Self {
        Self::new(
            FatalCheckKind::EmptyMask,
            format!("Mask area is 0 for {}", base.as_ref().display()),
        )
    }

    pub fn unsupported_mask_type(color_type: image::ColorType) -> Self {
        Self::new(
            FatalCheckKind::UnsupportedMaskType,
            format!("mask is not a boolean or uint8 (found {:?})", color_type),
        )
    }

    pub fn shape_mismatch<S: Into<String>>(detail: S) -> Self {
        Self::new(FatalCheckKind::ShapeMismatch, detail)
    }

    pub fn image_decode<P: AsRef<Path>>(path: P, error: &image::ImageError) -> Self {
        Self::new(
            FatalCheckKind::ImageDecode,
            format!("Failed to decode {}: {}", path.as_ref().display(), error),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = VerifyError::invalid_config("test config error");
        assert!(matches!(err, VerifyError::InvalidConfig(_)));

        let err = VerifyError::quarantine("rename failed");
        assert!(matches!(err, VerifyError::Quarantine(_)));
    }

    #[test]
    fn test_error_display() {
        let err = VerifyError::invalid_config("Root path is empty");
        assert_eq!(err.to_string(), "Invalid configuration: Root path is empty");
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = VerifyError::file_io_error("read metadata", Path::new("/data/a/prompt.json"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("read metadata"));
        assert!(error_string.contains("/data/a/prompt.json"));

        let err = VerifyError::config_value_error("max_workers", 0, "1-1024", Some(48));
        let error_string = err.to_string();
        assert!(error_string.contains("max_workers"));
        assert!(error_string.contains("1-1024"));
        assert!(error_string.contains("Recommended: 48"));
    }

    #[test]
    fn test_fatal_check_error_converts_transparently() {
        let fatal = FatalCheckError::empty_mask("/data/a/sample");
        assert_eq!(fatal.kind, FatalCheckKind::EmptyMask);
        assert_eq!(fatal.to_string(), "Mask area is 0 for /data/a/sample");

        let err: VerifyError = fatal.into();
        assert_eq!(err.to_string(), "Mask area is 0 for /data/a/sample");
    }
}
