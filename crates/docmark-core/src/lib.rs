pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extraction;
pub mod format;
pub mod markdown;
pub mod outcome;
pub mod upload;

use std::path::Path;

pub use dispatcher::Dispatcher;
pub use error::DocmarkError;
pub use format::FormatTag;
pub use outcome::{ErrorKind, ExtractionResult};
pub use upload::SourceFile;

/// Main API entry point: extract the text of one file with the default
/// configuration.
///
/// The format is chosen from the extension of `path` alone. Failures are
/// reported in the returned [`ExtractionResult`], never as a panic or `Err`.
pub fn extract(path: &Path) -> ExtractionResult {
    Dispatcher::default().extract(path)
}
