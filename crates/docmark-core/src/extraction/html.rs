use tracing::debug;

use crate::error::DocmarkError;
use crate::markdown::html_to_markdown;

/// Decode an HTML file as UTF-8 and convert it to Markdown.
///
/// Invalid UTF-8 is an error rather than being replaced.
pub fn extract_text(bytes: Vec<u8>) -> Result<String, DocmarkError> {
    let html = String::from_utf8(bytes).map_err(|e| DocmarkError::Encoding(e.to_string()))?;
    let html = html.strip_prefix('\u{feff}').unwrap_or(&html);
    let markdown = html_to_markdown(html);
    debug!(html_bytes = html.len(), markdown_bytes = markdown.len(), "html converted");
    Ok(markdown)
}
