use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// File extensions the reader will pick up while walking a folder.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "pdf"];

/// A supported document format, detected from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Format {
    /// Plain text (.txt)
    Text,
    /// Markdown, read as raw text (.md)
    Markdown,
    /// Page-structured binary document (.pdf)
    Pdf,
}
impl Format {
    /// Detect the format from a file extension (case-insensitive).
    ///
    /// Returns `None` for anything the reader does not support, including
    /// dotfiles such as `.txt` which have no extension at all.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "txt" => Some(Format::Text),
                "md" => Some(Format::Markdown),
                "pdf" => Some(Format::Pdf),
                _ => None,
            })
    }

    /// Text formats are decoded; everything else goes through an extractor.
    pub fn is_plaintext(&self) -> bool {
        matches!(self, Format::Text | Format::Markdown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Markdown => "markdown",
            Format::Pdf => "pdf",
        }
    }
}
impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
