use std::fmt;
use std::path::Path;

/// File-type classification derived from a file's extension.
///
/// Recomputed for every request and never stored. Extensions are matched
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// `.docx`
    WordDoc,
    /// `.xlsx`
    Spreadsheet,
    /// `.pptx`
    Presentation,
    /// `.html`, `.htm`
    Markup,
    /// `.pdf`
    PageDescription,
    /// `.jpg`, `.jpeg`, `.png`
    Image,
    /// `.mp3`
    Audio,
    /// Anything else. Holds the lowercased extension without the dot
    /// (empty when the path has none).
    Unsupported(String),
}

impl FormatTag {
    /// Classify a bare extension such as `"DOCX"` or `"htm"`.
    pub fn from_extension(ext: &str) -> FormatTag {
        let lower = ext.trim_start_matches('.').to_lowercase();
        match lower.as_str() {
            "docx" => FormatTag::WordDoc,
            "xlsx" => FormatTag::Spreadsheet,
            "pptx" => FormatTag::Presentation,
            "html" | "htm" => FormatTag::Markup,
            "pdf" => FormatTag::PageDescription,
            "jpg" | "jpeg" | "png" => FormatTag::Image,
            "mp3" => FormatTag::Audio,
            _ => FormatTag::Unsupported(lower),
        }
    }

    pub fn from_path(path: &Path) -> FormatTag {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        FormatTag::from_extension(&ext)
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, FormatTag::Markup)
    }

    /// The extension as shown to users: `".xyz"`, or `""` when there is none.
    pub fn dotted_extension(&self) -> String {
        match self {
            FormatTag::Unsupported(ext) if ext.is_empty() => String::new(),
            FormatTag::Unsupported(ext) => format!(".{ext}"),
            other => format!(".{}", other.canonical_extension()),
        }
    }

    fn canonical_extension(&self) -> &str {
        match self {
            FormatTag::WordDoc => "docx",
            FormatTag::Spreadsheet => "xlsx",
            FormatTag::Presentation => "pptx",
            FormatTag::Markup => "html",
            FormatTag::PageDescription => "pdf",
            FormatTag::Image => "png",
            FormatTag::Audio => "mp3",
            FormatTag::Unsupported(ext) => ext,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::WordDoc => write!(f, "word document"),
            FormatTag::Spreadsheet => write!(f, "spreadsheet"),
            FormatTag::Presentation => write!(f, "presentation"),
            FormatTag::Markup => write!(f, "HTML"),
            FormatTag::PageDescription => write!(f, "PDF"),
            FormatTag::Image => write!(f, "image"),
            FormatTag::Audio => write!(f, "audio"),
            FormatTag::Unsupported(ext) if ext.is_empty() => write!(f, "unsupported (no extension)"),
            FormatTag::Unsupported(ext) => write!(f, "unsupported (.{ext})"),
        }
    }
}
