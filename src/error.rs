//! Binary Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not initialize logging")]
    Logging,
    #[display("could not listen on {_0}")]
    Bind(#[error(not(source))] String),
    #[display("HTTP server stopped unexpectedly")]
    Server,
    #[display("scan could not be started")]
    Submit,
    #[display("scan did not finish")]
    Wait,
    #[display("scan failed: {_0}")]
    ScanFailed(#[error(not(source))] String),
    #[display("could not write report to {}", _0.display())]
    Report(#[error(not(source))] PathBuf),
    #[display("could not serialize output")]
    Serialize,
}
impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Bind(_) | Self::Wait)
    }
}
