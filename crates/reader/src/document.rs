use crate::decode::decode;
use crate::format::Format;
use crate::models::{DocumentRecord, FailureKind, FileFailure};
use crate::options::ScanOptions;
use crate::pdf::extract_pdf;
use std::path::Path;
use tracing::instrument;

/// Count whitespace-delimited tokens, the same way regardless of format.
pub fn count_words(text: &str) -> u64 {
    // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
    u64::try_from(text.split_whitespace().count()).unwrap_or(u64::MAX)
}

/// Base name used for reporting, falling back to the full path for oddities
/// such as a path ending in `..`.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads and extracts a single file.
///
/// The size ceiling is checked against the size on disk *before* the file is
/// read, so an oversized file is never loaded into memory. Every problem is
/// returned as a [`FileFailure`]; nothing here can abort a scan.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn read_document(path: &Path, options: &ScanOptions) -> Result<DocumentRecord, FileFailure> {
    let filename = display_name(path);
    let Some(format) = Format::from_path(path) else {
        return Err(FileFailure::new(FailureKind::CorruptFormat, filename, "unsupported file type"));
    };
    let metadata = tokio::fs::metadata(path).await.map_err(|e| FileFailure::from_io(&filename, &e))?;
    let size = metadata.len();
    if size > options.max_file_size_bytes {
        tracing::warn!(file = %filename, size, limit = options.max_file_size_bytes, "File exceeds max size; skipping");
        return Err(FileFailure::oversized(filename));
    }
    let bytes = tokio::fs::read(path).await.map_err(|e| FileFailure::from_io(&filename, &e))?;

    let (text, encoding) = if format.is_plaintext() {
        let decoded = decode(&bytes, options).ok_or_else(|| {
            FileFailure::new(FailureKind::DecodeFailure, &filename, "could not decode with any configured encoding")
        })?;
        (decoded.text, Some(decoded.encoding.to_string()))
    } else {
        let text = extract_pdf(bytes).await.map_err(|detail| FileFailure::new(FailureKind::CorruptFormat, &filename, detail))?;
        (text, None)
    };
    tracing::debug!(file = %filename, characters = text.len(), encoding = ?encoding, "Extracted text");

    Ok(DocumentRecord {
        word_count: count_words(&text),
        filename,
        text,
        file_path: path.to_path_buf(),
        file_size_bytes: size,
        format,
        encoding,
    })
}
