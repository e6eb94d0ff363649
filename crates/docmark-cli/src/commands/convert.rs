use docmark_core::config::{self, DispatcherConfig, PdfBackendKind, Profile};
use docmark_core::error::DocmarkError;
use docmark_core::upload::{output_file_name, SizeAdvisory};
use docmark_core::{Dispatcher, ExtractionResult, SourceFile};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::output;

pub struct ConvertArgs {
    pub input_file: PathBuf,
    pub output_format: String,
    pub out: Option<PathBuf>,
    pub stdout: bool,
    pub config: Option<PathBuf>,
    pub profile: Option<String>,
    pub pdf_backend: Option<String>,
    pub converter: Option<String>,
    pub preview: Option<usize>,
}

/// Convert one file. Returns `Ok(false)` when extraction produced a failure
/// result; `Err` is reserved for problems outside the extraction itself.
pub fn run(args: ConvertArgs) -> Result<bool, DocmarkError> {
    let config = resolve_config(&args)?;

    let source = SourceFile::stage_copy(&args.input_file)?;
    if source.is_empty() {
        warn!(path = %args.input_file.display(), "input file is empty");
    }
    if let Some(warning) = SizeAdvisory::for_len(source.len(), config.large_file_threshold).warning()
    {
        eprintln!("{warning}");
    }

    let dispatcher = Dispatcher::from_config(&config);
    info!(
        profile = %dispatcher.profile(),
        pdf_backend = dispatcher.pdf_backend_name(),
        "converting {}",
        args.input_file.display()
    );
    let result = dispatcher.extract(source.path());
    let input_len = source.len();
    // Staged copy is removed here, before any output is written.
    drop(source);

    if args.output_format == "json" {
        output::json::print(&result)?;
        if let ExtractionResult::Success { text } = &result {
            if let Some(path) = &args.out {
                std::fs::write(path, text)?;
            }
        }
        return Ok(result.is_success());
    }

    let text = match &result {
        ExtractionResult::Success { text } => text,
        ExtractionResult::Failure { message, .. } => {
            eprintln!("{message}");
            return Ok(false);
        }
    };

    if args.stdout {
        print!("{text}");
        return Ok(true);
    }

    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(output_file_name(&args.input_file)));
    std::fs::write(&out_path, text)?;

    eprintln!("File processed successfully!");
    output::table::print_preview(&result, config.preview_chars);
    output::table::print_sizes(
        &args.input_file,
        input_len,
        &out_path,
        text.len() as u64,
    );
    eprintln!("\nWritten to {}", out_path.display());

    Ok(true)
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(args: &ConvertArgs) -> Result<DispatcherConfig, DocmarkError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => DispatcherConfig::default(),
    };

    if let Some(name) = &args.profile {
        config.profile = Profile::from_str_loose(name).ok_or_else(|| {
            DocmarkError::ConfigInvalid(format!(
                "unknown profile '{name}'. Available: native, generic"
            ))
        })?;
    }
    if let Some(name) = &args.pdf_backend {
        config.pdf_backend = PdfBackendKind::from_str_loose(name).ok_or_else(|| {
            DocmarkError::ConfigInvalid(format!(
                "unknown PDF backend '{name}'. Available: lopdf, pdftotext"
            ))
        })?;
    }
    if let Some(program) = &args.converter {
        config.converter.program = program.clone();
    }
    if let Some(chars) = args.preview {
        config.preview_chars = chars;
    }

    config::validate_config(&config)?;
    Ok(config)
}
