use lopdf::Document;

use crate::error::DocmarkError;
use crate::extraction::PdfBackend;

/// Pure-Rust PDF backend built on lopdf. Needs no system tools.
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        LopdfBackend
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for LopdfBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DocmarkError> {
        let doc = Document::load_mem(pdf_bytes).map_err(|e| DocmarkError::Pdf(e.to_string()))?;

        doc.get_pages()
            .keys()
            .map(|&page_number| {
                doc.extract_text(&[page_number])
                    .map_err(|e| DocmarkError::Pdf(format!("page {page_number}: {e}")))
            })
            .collect()
    }

    fn backend_name(&self) -> &str {
        "lopdf"
    }
}
