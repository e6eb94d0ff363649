use tracing::debug;

use crate::error::DocmarkError;
use crate::extraction::PdfBackend;

/// Join the pages of a PDF, each followed by `\n`.
///
/// A page without extractable text (a scanned image, say) contributes an
/// empty line; it does not fail the extraction.
pub fn extract_text(bytes: &[u8], backend: &dyn PdfBackend) -> Result<String, DocmarkError> {
    let pages = backend.extract_pages(bytes)?;

    let mut text = String::new();
    let mut blank_pages = 0;
    for (i, page) in pages.iter().enumerate() {
        if page.trim().is_empty() {
            debug!(page = i + 1, "page has no extractable text");
            blank_pages += 1;
        }
        text.push_str(page);
        text.push('\n');
    }

    debug!(
        backend = backend.backend_name(),
        pages = pages.len(),
        blank_pages,
        "pdf extracted"
    );
    Ok(text)
}
