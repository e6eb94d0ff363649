use std::path::Path;

use tracing::{debug, warn};

use crate::config::{DispatcherConfig, PdfBackendKind, Profile};
use crate::error::DocmarkError;
use crate::extraction::generic::CommandConverter;
use crate::extraction::lopdf_backend::LopdfBackend;
use crate::extraction::pdftotext::PdftotextBackend;
use crate::extraction::{docx, generic, html, pdf, pptx, xlsx, Converter, PdfBackend};
use crate::format::FormatTag;
use crate::outcome::ExtractionResult;

/// Routes a file to the extraction strategy for its format.
///
/// Holds only immutable configuration, so one dispatcher can serve any number
/// of independent requests.
pub struct Dispatcher {
    profile: Profile,
    pdf_backend: Box<dyn PdfBackend>,
    converter: Box<dyn Converter>,
}

impl Dispatcher {
    pub fn new(
        profile: Profile,
        pdf_backend: Box<dyn PdfBackend>,
        converter: Box<dyn Converter>,
    ) -> Self {
        Dispatcher {
            profile,
            pdf_backend,
            converter,
        }
    }

    pub fn from_config(config: &DispatcherConfig) -> Self {
        let pdf_backend: Box<dyn PdfBackend> = match config.pdf_backend {
            PdfBackendKind::Lopdf => Box::new(LopdfBackend::new()),
            PdfBackendKind::Pdftotext => Box::new(PdftotextBackend::new()),
        };
        let converter = CommandConverter::new(
            config.converter.program.clone(),
            config.converter.args.clone(),
        );
        Dispatcher::new(config.profile, pdf_backend, Box::new(converter))
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn pdf_backend_name(&self) -> &str {
        self.pdf_backend.backend_name()
    }

    /// Extract text from the file at `path`.
    ///
    /// Never fails outright: every error is folded into
    /// [`ExtractionResult::Failure`].
    pub fn extract(&self, path: &Path) -> ExtractionResult {
        let tag = FormatTag::from_path(path);
        debug!(path = %path.display(), format = %tag, profile = %self.profile, "dispatching");

        let outcome = match self.profile {
            Profile::Native => match self.extract_native(path, &tag) {
                Some(outcome) => outcome,
                None => {
                    warn!(format = %tag, "unsupported file type");
                    return ExtractionResult::unsupported(&tag);
                }
            },
            Profile::Generic => generic::extract_text(path, &tag, self.converter.as_ref()),
        };

        match outcome {
            Ok(text) => {
                debug!(chars = text.chars().count(), "extraction succeeded");
                ExtractionResult::success(text)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "extraction failed");
                ExtractionResult::extraction_error(&e)
            }
        }
    }

    /// `None` when the tag has no built-in strategy.
    fn extract_native(
        &self,
        path: &Path,
        tag: &FormatTag,
    ) -> Option<Result<String, DocmarkError>> {
        let strategy = Strategy::for_tag(tag)?;
        debug!(?strategy, "native strategy selected");
        Some(
            std::fs::read(path)
                .map_err(DocmarkError::from)
                .and_then(|bytes| strategy.run(bytes, self.pdf_backend.as_ref())),
        )
    }
}

/// Built-in extraction strategies of the native profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    WordDoc,
    Spreadsheet,
    Presentation,
    Markup,
    PageDescription,
}

impl Strategy {
    fn for_tag(tag: &FormatTag) -> Option<Strategy> {
        match tag {
            FormatTag::WordDoc => Some(Strategy::WordDoc),
            FormatTag::Spreadsheet => Some(Strategy::Spreadsheet),
            FormatTag::Presentation => Some(Strategy::Presentation),
            FormatTag::Markup => Some(Strategy::Markup),
            FormatTag::PageDescription => Some(Strategy::PageDescription),
            FormatTag::Image | FormatTag::Audio | FormatTag::Unsupported(_) => None,
        }
    }

    fn run(self, bytes: Vec<u8>, pdf_backend: &dyn PdfBackend) -> Result<String, DocmarkError> {
        match self {
            Strategy::WordDoc => docx::extract_text(bytes),
            Strategy::Spreadsheet => xlsx::extract_text(bytes),
            Strategy::Presentation => pptx::extract_text(bytes),
            Strategy::Markup => html::extract_text(bytes),
            Strategy::PageDescription => pdf::extract_text(&bytes, pdf_backend),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::from_config(&DispatcherConfig::default())
    }
}
