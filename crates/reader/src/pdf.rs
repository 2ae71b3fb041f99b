//! PDF text extraction.
//!
//! Parsing happens on Tokio's blocking pool: the PDF parser is synchronous and
//! CPU-heavy, and a panic inside it must stay confined to the one file.

use tracing::instrument;

/// Extract the text of every page, concatenated in document order.
///
/// The error is a human-readable detail for a per-file failure.
#[instrument(level = "debug", skip(bytes), fields(size = bytes.len()))]
pub(crate) async fn extract_pdf(bytes: Vec<u8>) -> Result<String, String> {
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes)).await;
    match pages {
        Ok(Ok(pages)) => {
            tracing::trace!(pages = pages.len(), "Extracted PDF pages");
            Ok(join_pages(pages))
        },
        Ok(Err(e)) => Err(format!("unreadable PDF: {e}")),
        // Either a panic inside the parser or the runtime is shutting down.
        Err(e) => Err(format!("PDF extraction aborted: {e}")),
    }
}

/// Concatenate page texts, making sure the last word of one page never runs
/// into the first word of the next.
pub(crate) fn join_pages(pages: impl IntoIterator<Item = String>) -> String {
    let mut text = String::new();
    for page in pages {
        if page.is_empty() {
            continue;
        }
        if !text.is_empty() && !text.ends_with(char::is_whitespace) && !page.starts_with(char::is_whitespace) {
            text.push('\n');
        }
        text.push_str(&page);
    }
    text
}

/// Minimal PDF with one Helvetica text line per page.
#[cfg(test)]
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    // Objects 1-3 are the catalog, page tree and font; every page then takes
    // two numbers, the page followed by its content stream.
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids.iter().map(|id| format!("{id} 0 R")).collect::<Vec<_>>().join(" ");
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (text, id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            id + 1
        ));
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", i + 1).as_bytes());
    }
    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!("trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%EOF\n", objects.len() + 1).as_bytes(),
    );
    pdf
}
