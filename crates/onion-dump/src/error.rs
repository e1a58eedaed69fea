//! Error types for point cloud output.

use thiserror::Error;

/// Result type for dump operations.
pub type DumpResult<T> = Result<T, DumpError>;

/// Errors that can occur while reading or writing point cloud files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DumpError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension maps to no supported format.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// The extension that was not recognized.
        format: String,
    },

    /// A coordinate table row could not be parsed.
    #[error("invalid coordinate data: {reason}")]
    InvalidData {
        /// Description of the malformed content.
        reason: String,
    },
}

impl DumpError {
    /// Creates a [`DumpError::InvalidData`] from anything string-like.
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_display() {
        let err = DumpError::UnsupportedFormat {
            format: "obj".to_string(),
        };
        assert_eq!(format!("{err}"), "unsupported format: obj");
    }

    #[test]
    fn test_invalid_data_display() {
        let err = DumpError::invalid_data("bad x coordinate");
        assert_eq!(format!("{err}"), "invalid coordinate data: bad x coordinate");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DumpError = io_err.into();
        assert!(matches!(err, DumpError::Io(_)));
    }
}
