use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::DocmarkError;
use crate::extraction::generic::DEFAULT_PROGRAM;
use crate::upload::LARGE_FILE_THRESHOLD;

/// Default number of characters shown in a preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 1000;

/// Which set of extraction strategies the dispatcher uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Built-in parsers for docx, xlsx, pptx, html/htm and pdf. Other
    /// extensions are rejected as unsupported.
    #[default]
    Native,
    /// Every file goes to the external converter; HTML output is converted
    /// to Markdown afterwards.
    Generic,
}

impl Profile {
    /// Extensions accepted for upload under this profile.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Profile::Native => &["pdf", "pptx", "docx", "xlsx", "html", "htm"],
            Profile::Generic => &["pdf", "pptx", "docx", "xlsx", "jpg", "jpeg", "png", "mp3"],
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Profile> {
        match s.trim().to_lowercase().as_str() {
            "native" | "a" => Some(Profile::Native),
            "generic" | "b" => Some(Profile::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Native => write!(f, "native"),
            Profile::Generic => write!(f, "generic"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfBackendKind {
    #[default]
    Lopdf,
    Pdftotext,
}

impl PdfBackendKind {
    pub fn from_str_loose(s: &str) -> Option<PdfBackendKind> {
        match s.trim().to_lowercase().as_str() {
            "lopdf" => Some(PdfBackendKind::Lopdf),
            "pdftotext" | "poppler" => Some(PdfBackendKind::Pdftotext),
            _ => None,
        }
    }
}

impl fmt::Display for PdfBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfBackendKind::Lopdf => write!(f, "lopdf"),
            PdfBackendKind::Pdftotext => write!(f, "pdftotext"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Program to run. Looked up on `PATH`.
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before the input path.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            program: default_program(),
            args: Vec::new(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub pdf_backend: PdfBackendKind,
    #[serde(default)]
    pub converter: ConverterConfig,
    /// Inputs larger than this many bytes get a processing-time warning.
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: u64,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            profile: Profile::default(),
            pdf_backend: PdfBackendKind::default(),
            converter: ConverterConfig::default(),
            large_file_threshold: default_large_file_threshold(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

/// Load a dispatcher config from a JSON file.
pub fn load_config(path: &Path) -> Result<DispatcherConfig, DocmarkError> {
    let content = std::fs::read_to_string(path).map_err(|e| DocmarkError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: DispatcherConfig =
        serde_json::from_str(&content).map_err(|e| DocmarkError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a dispatcher config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<DispatcherConfig, DocmarkError> {
    let config: DispatcherConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &DispatcherConfig) -> Result<(), DocmarkError> {
    if config.converter.program.trim().is_empty() {
        return Err(DocmarkError::ConfigInvalid(
            "converter program must not be empty".into(),
        ));
    }

    if config.preview_chars == 0 {
        return Err(DocmarkError::ConfigInvalid(
            "preview_chars must be greater than zero".into(),
        ));
    }

    Ok(())
}
