//! Reader Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Only request-level problems become an
//! [`Error`]; anything confined to a single file is recorded as a
//! [`FileFailure`](crate::FileFailure) in the scan statistics instead.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};

/// A reader error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every variant aborts the whole scan, except `UnknownEncoding`, which only
/// comes from [`ScanOptions::validate`](crate::ScanOptions::validate).
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The requested folder does not exist.
    #[display("folder path does not exist: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The requested path exists but is not a directory.
    #[display("path is not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// The folder itself could not be listed.
    #[display("permission denied accessing folder: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// An encoding label that no decoder answers to.
    #[display("unknown encoding label: {_0:?}")]
    UnknownEncoding(#[error(not(source))] String),
    /// Underlying I/O error while opening the folder.
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl ErrorKind {
    /// Classify an I/O error raised while touching the scan root.
    pub(crate) fn from_io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` if the caller supplied a path that can never be scanned.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NotADirectory(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::NotFound(PathBuf::from("/missing")).to_string(),
            "folder path does not exist: /missing"
        );
        assert_eq!(
            ErrorKind::NotADirectory(PathBuf::from("/etc/hosts")).to_string(),
            "path is not a directory: /etc/hosts"
        );
    }

    #[test]
    fn io_errors_are_classified() {
        let path = Path::new("/data");
        let kind = ErrorKind::from_io(IoError::from(std::io::ErrorKind::NotFound), path);
        assert!(matches!(kind, ErrorKind::NotFound(_)));
        assert!(kind.is_invalid_path());
        let kind = ErrorKind::from_io(IoError::from(std::io::ErrorKind::PermissionDenied), path);
        assert!(matches!(kind, ErrorKind::PermissionDenied(_)));
        assert!(!kind.is_retryable());
        let kind = ErrorKind::from_io(IoError::from(std::io::ErrorKind::Interrupted), path);
        assert!(kind.is_retryable());
    }
}
