//! Delegation to an external multi-format converter.
//!
//! The converter program is run as `<program> <args...> <path>` and is
//! expected to print the text rendition of the file on stdout. The default
//! is `markitdown`, which handles office documents, PDFs, images (metadata
//! and OCR where configured) and audio (transcription where configured).

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::DocmarkError;
use crate::extraction::Converter;
use crate::format::FormatTag;
use crate::markdown::html_to_markdown;

pub const DEFAULT_PROGRAM: &str = "markitdown";

pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandConverter {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if the converter program can be spawned.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .is_ok()
    }
}

impl Default for CommandConverter {
    fn default() -> Self {
        CommandConverter::new(DEFAULT_PROGRAM, Vec::new())
    }
}

impl Converter for CommandConverter {
    fn convert(&self, path: &Path) -> Result<Vec<u8>, DocmarkError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DocmarkError::ToolNotFound {
                        program: self.program.clone(),
                        hint: format!(
                            "Install it or set a different converter program (e.g. pip install {DEFAULT_PROGRAM})"
                        ),
                    }
                } else {
                    DocmarkError::Io(e)
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DocmarkError::ToolFailed {
                program: self.program.clone(),
                code,
                stderr,
            });
        }

        Ok(output.stdout)
    }

    fn converter_name(&self) -> &str {
        &self.program
    }
}

/// Run the converter, decode its output as UTF-8 and, for HTML input,
/// convert the result to Markdown.
pub fn extract_text(
    path: &Path,
    tag: &FormatTag,
    converter: &dyn Converter,
) -> Result<String, DocmarkError> {
    let bytes = converter.convert(path)?;
    debug!(
        converter = converter.converter_name(),
        bytes = bytes.len(),
        "external conversion finished"
    );

    let text = String::from_utf8(bytes).map_err(|e| {
        DocmarkError::Encoding(format!("{} output: {e}", converter.converter_name()))
    })?;

    if tag.is_markup() {
        Ok(html_to_markdown(&text))
    } else {
        Ok(text)
    }
}
