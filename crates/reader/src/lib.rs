//! Folder scanning and plain-text extraction.
//!
//! Walks a directory (recursively by default), picks up `.txt`, `.md` and
//! `.pdf` files, extracts their text and word counts, and aggregates
//! [`ScanStatistics`]. Only request-level problems (missing folder, not a
//! directory, folder cannot be listed) fail a scan; everything that goes wrong
//! with an individual file is recorded as a [`FileFailure`] and the scan moves
//! on to the next file.
//!
//! The primary entry point is [`scan_folder`]; [`scan`] exposes the same work
//! as a stream of [`ScanEvent`]s for callers that want progress.

mod decode;
mod document;
pub mod error;
mod format;
mod models;
mod options;
mod pdf;
mod scan;
mod walk;

pub use crate::document::{count_words, read_document};
pub use crate::format::{Format, SUPPORTED_EXTENSIONS};
pub use crate::models::{DocumentRecord, FailureKind, FileFailure, ScanOutcome, ScanStatistics};
pub use crate::options::{DEFAULT_ENCODING, DEFAULT_FALLBACK_ENCODINGS, DEFAULT_MAX_FILE_SIZE_MB, ScanOptions};
pub use crate::scan::{ScanEvent, scan, scan_folder};
