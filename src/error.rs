//! Error types for the bucketvol library.

use thiserror::Error;

/// Main error type for volume operations.
#[derive(Error, Debug)]
pub enum VolumeError {
    /// Volume configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No object, folder marker or child entry exists for the path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed path handed in by the caller.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Transport, auth or service failure while talking to the object store.
    #[error("Backend error during {operation} on '{key}': {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// Operation this driver does not implement.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Copy succeeded but removing the source failed; both objects now exist.
    #[error("Move of '{source_path}' to '{target_path}' left the source in place: {cause}")]
    PartialMove {
        source_path: String,
        target_path: String,
        cause: Box<VolumeError>,
    },

    /// Image decode or encode failure.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Local I/O error (temporary spool files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VolumeError {
    /// Build a backend error for an operation on a key.
    pub fn backend(operation: &'static str, key: &str, message: impl ToString) -> Self {
        VolumeError::Backend {
            operation,
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    /// Check whether this error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VolumeError::NotFound(_))
    }
}

/// Result type alias for volume operations.
pub type Result<T> = std::result::Result<T, VolumeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_message() {
        let err = VolumeError::backend("head", "docs/a.txt", "connection reset");
        assert_eq!(
            err.to_string(),
            "Backend error during head on 'docs/a.txt': connection reset"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_partial_move_keeps_cause() {
        let err = VolumeError::PartialMove {
            source_path: "a.txt".to_string(),
            target_path: "b/a.txt".to_string(),
            cause: Box::new(VolumeError::backend("delete", "a.txt", "timeout")),
        };
        assert!(err.to_string().contains("left the source in place"));
        assert!(err.to_string().contains("timeout"));
    }
}
