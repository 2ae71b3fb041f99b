//! Task Coordinator Error Types
//!
//! Only request-invalid conditions surface as an [`Error`]. Anything that goes
//! wrong while a scan executes is absorbed into the task's own `failed` state.

use crate::MAX_FILE_SIZE_MB_RANGE;
use derive_more::{Display, Error};

/// A task coordinator error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for task coordinator operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The requested per-file ceiling is outside the accepted range.
    #[display(
        "max_file_size_mb must be between {} and {}, got {_0}",
        MAX_FILE_SIZE_MB_RANGE.start(),
        MAX_FILE_SIZE_MB_RANGE.end()
    )]
    InvalidMaxFileSize(#[error(not(source))] u32),
    /// A status filter that is not one of the four task states.
    #[display("unknown task status: {_0}")]
    UnknownStatus(#[error(not(source))] String),
    /// No task is registered under the identifier.
    #[display("Task {_0} not found")]
    NotFound(#[error(not(source))] String),
    /// The task did not reach a terminal state in time.
    #[display("timed out waiting for task to finish")]
    Timeout,
}
impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if the caller sent a parameter that can never be accepted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidMaxFileSize(_) | Self::UnknownStatus(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::InvalidMaxFileSize(0).to_string(),
            "max_file_size_mb must be between 1 and 1000, got 0"
        );
        assert_eq!(ErrorKind::NotFound("abc".to_string()).to_string(), "Task abc not found");
    }

    #[test]
    fn error_classification() {
        assert!(ErrorKind::InvalidMaxFileSize(1001).is_validation());
        assert!(ErrorKind::UnknownStatus("done".to_string()).is_validation());
        assert!(!ErrorKind::NotFound("abc".to_string()).is_validation());
        assert!(ErrorKind::Timeout.is_retryable());
    }
}
