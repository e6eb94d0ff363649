use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DocmarkError;
use crate::format::FormatTag;

/// Classification of a failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The format tag is not in the dispatcher's supported set. No parser ran.
    UnsupportedFormat,
    /// A parser, decoder or external tool failed on a supported file.
    ExtractionError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnsupportedFormat => write!(f, "unsupported format"),
            ErrorKind::ExtractionError => write!(f, "extraction error"),
        }
    }
}

/// Outcome of one extraction attempt. Either the full text or a failure;
/// there are no partial results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult {
    Success { text: String },
    Failure { kind: ErrorKind, message: String },
}

impl ExtractionResult {
    pub fn success(text: impl Into<String>) -> Self {
        ExtractionResult::Success { text: text.into() }
    }

    pub fn unsupported(tag: &FormatTag) -> Self {
        ExtractionResult::Failure {
            kind: ErrorKind::UnsupportedFormat,
            message: format!(
                "Unsupported file type '{}'. Please upload a supported file.",
                tag.dotted_extension()
            ),
        }
    }

    pub fn extraction_error(err: &DocmarkError) -> Self {
        ExtractionResult::Failure {
            kind: ErrorKind::ExtractionError,
            message: format!(
                "Error processing file: {err}. Please ensure the file is not corrupted."
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }

    /// The extracted text, if the extraction succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Success { text } => Some(text),
            ExtractionResult::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ExtractionResult::Success { .. } => None,
            ExtractionResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// First `max_chars` characters of the extracted text. Empty on failure.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text() {
            Some(text) => match text.char_indices().nth(max_chars) {
                Some((end, _)) => &text[..end],
                None => text,
            },
            None => "",
        }
    }
}
