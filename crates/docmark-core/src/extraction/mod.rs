pub mod docx;
pub mod generic;
pub mod html;
pub mod lopdf_backend;
pub mod ooxml;
pub mod pdf;
pub mod pdftotext;
pub mod pptx;
pub mod xlsx;

use std::path::Path;

use crate::error::DocmarkError;

/// Trait for PDF text extraction backends.
pub trait PdfBackend: Send + Sync {
    /// Extract the text of every page, in page order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DocmarkError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Trait for external multi-format converters.
///
/// A converter takes a file on disk and returns the raw bytes of its text
/// rendition. Decoding is left to the caller.
pub trait Converter: Send + Sync {
    fn convert(&self, path: &Path) -> Result<Vec<u8>, DocmarkError>;

    fn converter_name(&self) -> &str;
}
