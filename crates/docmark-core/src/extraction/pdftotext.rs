use crate::error::DocmarkError;
use crate::extraction::PdfBackend;
use std::io::Write;
use std::process::Command;

const INSTALL_HINT: &str =
    "Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)";

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` to preserve whitespace alignment of tables.
pub struct PdftotextBackend;

impl PdftotextBackend {
    pub fn new() -> Self {
        PdftotextBackend
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for PdftotextBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DocmarkError> {
        // pdftotext only reads from a path
        let mut tmpfile = tempfile::NamedTempFile::new()?;
        tmpfile.write_all(pdf_bytes)?;
        tmpfile.flush()?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DocmarkError::ToolNotFound {
                        program: "pdftotext".into(),
                        hint: INSTALL_HINT.into(),
                    }
                } else {
                    DocmarkError::Pdf(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DocmarkError::ToolFailed {
                program: "pdftotext".into(),
                code,
                stderr,
            });
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| DocmarkError::Encoding(format!("pdftotext output: {e}")))?;
        Ok(split_pages(&text))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split pdftotext output into pages.
///
/// pdftotext terminates every page with a form feed (`\x0c`), so the piece
/// after the last one is not a page. The newline ending each page's last line
/// is dropped; the caller adds its own page separator.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text
        .split('\x0c')
        .map(|p| p.strip_suffix('\n').unwrap_or(p).to_string())
        .collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }
    pages
}
