mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docmark",
    version,
    about = "Extract text and Markdown from office documents, PDFs and HTML"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). DOCMARK_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file to text and save it as converted_<name>.md
    Convert {
        /// Path to a docx, xlsx, pptx, html/htm or pdf file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the extracted text to this file instead of converted_<name>.md
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Print the full text to stdout and write no file
        #[arg(long, conflicts_with = "out")]
        stdout: bool,

        /// JSON config file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Extraction profile: native or generic
        #[arg(short, long, value_name = "NAME")]
        profile: Option<String>,

        /// PDF backend for the native profile: lopdf or pdftotext
        #[arg(long, value_name = "NAME")]
        pdf_backend: Option<String>,

        /// External converter program for the generic profile
        #[arg(long, value_name = "PROGRAM")]
        converter: Option<String>,

        /// Number of characters shown in the preview
        #[arg(long, value_name = "CHARS")]
        preview: Option<usize>,
    },
    /// List accepted file types and backend availability
    Formats,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("DOCMARK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input_file,
            output,
            out,
            stdout,
            config,
            profile,
            pdf_backend,
            converter,
            preview,
        } => commands::convert::run(commands::convert::ConvertArgs {
            input_file,
            output_format: output,
            out,
            stdout,
            config,
            profile,
            pdf_backend,
            converter,
            preview,
        }),
        Commands::Formats => commands::formats::run().map(|()| true),
    };

    match result {
        Ok(true) => {}
        // Extraction failed; the failure was already reported.
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
