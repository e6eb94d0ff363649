use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DocmarkError {
    #[error("failed to read archive: {0}")]
    Archive(String),

    #[error("document part '{0}' is missing")]
    MissingPart(String),

    #[error("malformed XML in '{part}': {reason}")]
    Xml { part: String, reason: String },

    #[error("failed to read workbook: {0}")]
    Spreadsheet(String),

    #[error("failed to read PDF: {0}")]
    Pdf(String),

    #[error("file is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("{program} not found. {hint}")]
    ToolNotFound { program: String, hint: String },

    #[error("{program} failed with exit code {code}: {stderr}")]
    ToolFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
