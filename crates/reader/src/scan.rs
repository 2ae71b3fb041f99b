use crate::document::read_document;
use crate::error::{ErrorKind, Result};
use crate::models::{DocumentRecord, FailureKind, FileFailure, ScanOutcome, ScanStatistics};
use crate::options::ScanOptions;
use crate::walk::eligible_files;
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs::{self, ReadDir};
use tracing::instrument;

/// Progress events emitted by [`scan`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once, after the folder was
///    validated and opened.
/// 2. [`Extracted`](Self::Extracted) or [`Skipped`](Self::Skipped): zero or
///    more times, one per eligible file, in enumeration order.
/// 3. [`Complete`](Self::Complete): exactly once, with the final statistics.
///
/// A request-level error is yielded *instead of* `Started`, and ends the
/// stream.
#[derive(Debug)]
pub enum ScanEvent {
    /// The folder exists and could be listed; carries its canonical path.
    Started(PathBuf),
    Extracted(Box<DocumentRecord>),
    Skipped(FileFailure),
    Complete(ScanStatistics),
}

/// Streams [`ScanEvent`]s while walking `path` and extracting every eligible
/// file according to `options`.
///
/// Files are processed one at a time; a scan only ever suspends on directory
/// listings, file reads and PDF extraction.
pub fn scan<'a>(path: impl Into<PathBuf>, options: &'a ScanOptions) -> impl Stream<Item = Result<ScanEvent>> + 'a {
    let path = path.into();
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let (root, entries) = match open_root(&path).await {
            Ok(opened) => opened,
            Err(e) => {
                let kind: &ErrorKind = &e;
                tracing::error!(path = %path.display(), error = %kind, "Unable to scan folder");
                yield Err(e);
                return;
            },
        };
        tracing::info!(path = %root.display(), recursive = options.recursive, "Starting folder scan");
        yield Ok(ScanEvent::Started(root.clone()));

        let mut stats = ScanStatistics::default();
        for await file in eligible_files(root, entries, options.recursive) {
            let result = match file {
                Ok(file) => read_document(&file, options).await,
                Err(failure) => Err(failure),
            };
            match result {
                Ok(document) => {
                    stats.record_success();
                    yield Ok(ScanEvent::Extracted(Box::new(document)));
                },
                Err(failure) => {
                    // Oversized files were already reported as a skip.
                    if failure.kind != FailureKind::OversizedFile {
                        tracing::error!(error = %failure, "Error processing file");
                    }
                    stats.record_failure(failure.clone());
                    yield Ok(ScanEvent::Skipped(failure));
                },
            }
        }

        tracing::info!(files_read = stats.files_read(), errors = stats.errors_count(), "Scan complete");
        yield Ok(ScanEvent::Complete(stats));
    })
}

/// Scan a folder and collect every extracted document.
///
/// # Errors
///
/// Returns an error (and touches no file) if the folder does not exist, is not
/// a directory, or cannot be listed. Problems with individual files never
/// fail the scan; they are recorded in [`ScanStatistics`].
///
/// # Examples
///
/// ```no_run
/// use docscan_reader::{ScanOptions, scan_folder};
///
/// # async fn example() -> docscan_reader::error::Result<()> {
/// let outcome = scan_folder("/data", &ScanOptions::default()).await?;
/// for doc in &outcome.documents {
///     println!("{}: {} words", doc.filename, doc.word_count);
/// }
/// println!("{} files read, {} errors", outcome.stats.files_read(), outcome.stats.errors_count());
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn scan_folder(path: impl AsRef<Path>, options: &ScanOptions) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    let mut events = std::pin::pin!(scan(path.as_ref(), options));
    while let Some(event) = events.next().await {
        match event? {
            ScanEvent::Extracted(document) => outcome.documents.push(*document),
            ScanEvent::Complete(stats) => outcome.stats = stats,
            ScanEvent::Started(_) | ScanEvent::Skipped(_) => {},
        }
    }
    Ok(outcome)
}

/// Validate the scan root and open it for listing.
async fn open_root(path: &Path) -> Result<(PathBuf, ReadDir)> {
    let metadata = fs::metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    if !metadata.is_dir() {
        exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
    }
    // Canonical root, so that every reported file path is absolute.
    let root = fs::canonicalize(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    let entries = fs::read_dir(&root).await.map_err(|e| ErrorKind::from_io(e, path))?;
    Ok((root, entries))
}
