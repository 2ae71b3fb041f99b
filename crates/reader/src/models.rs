//! Scan result models.
//!
//! A scan produces one [`DocumentRecord`] per extracted file and a single
//! [`ScanStatistics`] aggregate. Per-file problems are kept as typed
//! [`FileFailure`] values so callers can branch on [`FailureKind`], while the
//! serialized statistics expose the human-readable strings only.

use crate::format::Format;
use derive_more::Display;
use std::path::PathBuf;

/// One successfully scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentRecord {
    /// Base name with extension.
    pub filename: String,
    /// Full extracted text.
    pub text: String,
    /// Number of whitespace-delimited tokens in `text`.
    #[cfg_attr(feature = "serde", serde(alias = "words"))]
    pub word_count: u64,
    /// Absolute path on the scanning host.
    pub file_path: PathBuf,
    /// Size on disk at scan time.
    pub file_size_bytes: u64,
    pub format: Format,
    /// Encoding the text was decoded with (`None` for extracted formats).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub encoding: Option<String>,
}

/// Category of a per-file failure.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    /// The file is larger than the configured ceiling.
    OversizedFile,
    /// None of the configured encodings could decode the file.
    DecodeFailure,
    /// The file could not be parsed as its declared format.
    CorruptFormat,
    /// The file (or a subdirectory) could not be opened.
    PermissionDenied,
    /// Any other I/O problem confined to one entry.
    Io,
}

/// A failure confined to one file; it never affects other files in the scan.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{filename}: {detail}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileFailure {
    pub kind: FailureKind,
    pub filename: String,
    pub detail: String,
}
impl FileFailure {
    pub fn new(kind: FailureKind, filename: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            filename: filename.into(),
            detail: detail.into(),
        }
    }

    pub fn oversized(filename: impl Into<String>) -> Self {
        Self::new(FailureKind::OversizedFile, filename, "exceeds max size")
    }

    /// Classify an I/O error raised while reading a single entry.
    pub(crate) fn from_io(filename: impl Into<String>, err: &std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            _ => FailureKind::Io,
        };
        Self::new(kind, filename, err.to_string())
    }
}

/// Aggregate of one scan run.
///
/// `errors_count` is derived from the recorded failures, so it can never
/// drift from the error list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(into = "ScanStatisticsProxy"))]
pub struct ScanStatistics {
    files_read: u64,
    failures: Vec<FileFailure>,
}
impl ScanStatistics {
    pub fn files_read(&self) -> u64 {
        self.files_read
    }

    pub fn errors_count(&self) -> u64 {
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        u64::try_from(self.failures.len()).unwrap_or(u64::MAX)
    }

    /// Typed failures, in encounter order.
    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// Human-readable failure descriptions, in encounter order.
    pub fn errors(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }

    pub(crate) fn record_success(&mut self) {
        self.files_read += 1;
    }

    pub(crate) fn record_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
struct ScanStatisticsProxy {
    files_read: u64,
    errors_count: u64,
    errors: Vec<String>,
}
#[cfg(feature = "serde")]
impl From<ScanStatistics> for ScanStatisticsProxy {
    fn from(stats: ScanStatistics) -> Self {
        Self {
            files_read: stats.files_read(),
            errors_count: stats.errors_count(),
            errors: stats.errors(),
        }
    }
}

/// Everything a completed scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub documents: Vec<DocumentRecord>,
    pub stats: ScanStatistics,
}
impl ScanOutcome {
    pub fn total_words(&self) -> u64 {
        self.documents.iter().map(|d| d.word_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display() {
        assert_eq!(FileFailure::oversized("big.txt").to_string(), "big.txt: exceeds max size");
        let failure = FileFailure::new(FailureKind::CorruptFormat, "broken.pdf", "invalid file header");
        assert_eq!(failure.to_string(), "broken.pdf: invalid file header");
    }

    #[test]
    fn statistics_count_follows_failures() {
        let mut stats = ScanStatistics::default();
        stats.record_success();
        stats.record_failure(FileFailure::oversized("a.txt"));
        stats.record_failure(FileFailure::new(FailureKind::DecodeFailure, "b.md", "undecodable"));
        assert_eq!(stats.files_read(), 1);
        assert_eq!(stats.errors_count(), 2);
        assert_eq!(stats.errors(), vec!["a.txt: exceeds max size", "b.md: undecodable"]);
        assert_eq!(stats.failures()[1].kind, FailureKind::DecodeFailure);
    }

    #[test]
    fn io_failures_are_classified() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert_eq!(FileFailure::from_io("x.txt", &denied).kind, FailureKind::PermissionDenied);
        let other = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(FileFailure::from_io("x.txt", &other).kind, FailureKind::Io);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn statistics_serialize_as_strings() {
        let mut stats = ScanStatistics::default();
        stats.record_success();
        stats.record_failure(FileFailure::oversized("big.pdf"));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"files_read": 1, "errors_count": 1, "errors": ["big.pdf: exceeds max size"]})
        );
    }
}
