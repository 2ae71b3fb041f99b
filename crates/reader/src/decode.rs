use crate::options::ScanOptions;
use encoding_rs::Encoding;
use std::borrow::Cow;
use tracing::instrument;

const LOSSY_UTF8: &str = "UTF-8 (lossy)";

/// Text decoded from raw file bytes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}
impl Decoded {
    fn new(text: Cow<'_, str>, encoding: &'static str) -> Self {
        Self { text: text.into_owned(), encoding }
    }
}

/// Decode plain-text bytes using the encoding chain from [`ScanOptions`].
///
/// A byte-order mark wins over every configured label. Otherwise each label
/// is tried strictly (malformed sequences are fatal) in order; unknown labels
/// are skipped. Returns `None` only when every strict attempt failed and the
/// lossy fallback is disabled.
#[instrument(level = "trace", skip(bytes, options), fields(size = bytes.len()))]
pub(crate) fn decode(bytes: &[u8], options: &ScanOptions) -> Option<Decoded> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes)
        && let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
    {
        return Some(Decoded::new(text, encoding.name()));
    }
    for label in options.encoding_chain() {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            tracing::warn!(label, "Unknown encoding label; skipping");
            continue;
        };
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => return Some(Decoded::new(text, encoding.name())),
            None => tracing::trace!(encoding = encoding.name(), "Decode attempt failed"),
        }
    }
    if options.lossy_fallback {
        return Some(Decoded::new(String::from_utf8_lossy(bytes), LOSSY_UTF8));
    }
    None
}
