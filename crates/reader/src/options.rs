use crate::error::{ErrorKind, Result};
use encoding_rs::Encoding;

/// Default ceiling on the size of a single file, in MiB.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;
pub const DEFAULT_ENCODING: &str = "utf-8";
/// Tried in order after the default encoding fails. `windows-1252` is the
/// WHATWG mapping for the `latin1`/`iso-8859-1` labels.
pub const DEFAULT_FALLBACK_ENCODINGS: [&str; 2] = ["utf-8", "windows-1252"];

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Knobs for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Files strictly larger than this are skipped with an error.
    pub max_file_size_bytes: u64,
    /// Encoding label (WHATWG) tried first for text formats.
    pub default_encoding: String,
    /// Encoding labels tried, in order, when the default fails.
    pub fallback_encodings: Vec<String>,
    /// As a last resort, decode as UTF-8 replacing invalid sequences.
    pub lossy_fallback: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
}
impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * BYTES_PER_MB,
            default_encoding: DEFAULT_ENCODING.to_string(),
            fallback_encodings: DEFAULT_FALLBACK_ENCODINGS.iter().map(ToString::to_string).collect(),
            lossy_fallback: true,
            recursive: true,
        }
    }
}
impl ScanOptions {
    pub fn with_max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    pub fn with_max_file_size_mb(self, mb: u64) -> Self {
        self.with_max_file_size_bytes(mb.saturating_mul(BYTES_PER_MB))
    }

    pub fn with_default_encoding(mut self, label: impl Into<String>) -> Self {
        self.default_encoding = label.into();
        self
    }

    pub fn with_fallback_encodings(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fallback_encodings = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lossy_fallback(mut self, lossy: bool) -> Self {
        self.lossy_fallback = lossy;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Check that every encoding label names a known decoder.
    ///
    /// Scanning tolerates unknown labels (they are skipped with a warning for
    /// every file), so this is for callers that want to reject them up front.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::UnknownEncoding`] with the first label that is not a
    /// WHATWG encoding label (`latin-1`, for instance, is not one; `latin1` is).
    pub fn validate(&self) -> Result<()> {
        match self.encoding_chain().into_iter().find(|label| Encoding::for_label(label.as_bytes()).is_none()) {
            Some(label) => exn::bail!(ErrorKind::UnknownEncoding(label.to_string())),
            None => Ok(()),
        }
    }

    /// Every encoding label to try, in order, with duplicates removed.
    pub(crate) fn encoding_chain(&self) -> Vec<&str> {
        let mut chain: Vec<&str> = Vec::with_capacity(self.fallback_encodings.len() + 1);
        for label in std::iter::once(&self.default_encoding).chain(&self.fallback_encodings) {
            let label = label.trim();
            if !label.is_empty() && !chain.iter().any(|seen| seen.eq_ignore_ascii_case(label)) {
                chain.push(label);
            }
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ScanOptions::default();
        assert_eq!(options.max_file_size_bytes, 50 * 1024 * 1024);
        assert_eq!(options.default_encoding, "utf-8");
        assert!(options.lossy_fallback);
        assert!(options.recursive);
    }

    #[test]
    fn mb_is_converted_to_bytes() {
        assert_eq!(ScanOptions::default().with_max_file_size_mb(1).max_file_size_bytes, 1_048_576);
        assert_eq!(ScanOptions::default().with_max_file_size_mb(u64::MAX).max_file_size_bytes, u64::MAX);
    }

    #[test]
    fn known_labels_validate() {
        ScanOptions::default().validate().unwrap();
        ScanOptions::default()
            .with_default_encoding("Shift_JIS")
            .with_fallback_encodings(["latin1", " iso-8859-1 ", ""])
            .validate()
            .unwrap();
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = ScanOptions::default()
            .with_fallback_encodings(["utf-8", "latin-1", "klingon"])
            .validate()
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownEncoding(label) if label == "latin-1"));
        let kind: &ErrorKind = &err;
        assert_eq!(kind.to_string(), r#"unknown encoding label: "latin-1""#);
    }

    #[test]
    fn encoding_chain_is_deduplicated() {
        let options = ScanOptions::default().with_default_encoding("UTF-8");
        assert_eq!(options.encoding_chain(), vec!["UTF-8", "windows-1252"]);
        let options = ScanOptions::default().with_default_encoding("shift_jis").with_fallback_encodings(["", "latin1"]);
        assert_eq!(options.encoding_chain(), vec!["shift_jis", "latin1"]);
    }
}
