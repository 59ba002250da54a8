//! Enmark CLI - converts note-export (`.enex`) files to Markdown.
//!
//! Each export file becomes a directory of Markdown documents (one per
//! note) with decoded attachments alongside; see `enmark --help`.

mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use enmark_export::{DEFAULT_MAX_IMAGE_WIDTH, ExportOptions, convert_file};
use output::Output;

/// Convert note-export files to Markdown.
#[derive(Parser)]
#[command(name = "enmark", version, about)]
struct Cli {
    /// Export files to convert.
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Write converted notes here instead of a directory named after each
    /// export file.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum rendered image width in pixels.
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_MAX_IMAGE_WIDTH)]
    max_image_width: u32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = ExportOptions {
        output_dir: cli.output_dir,
        max_image_width: cli.max_image_width,
    };

    let mut failed = false;
    for file in &cli.files {
        match convert_file(file, &options) {
            Ok(summary) => {
                if summary.failures > 0 {
                    output.warning(&format!(
                        "{}: {} notes converted, {} with errors",
                        file.display(),
                        summary.notes,
                        summary.failures
                    ));
                } else {
                    output.success(&format!(
                        "{}: {} notes converted",
                        file.display(),
                        summary.notes
                    ));
                }
            }
            Err(err) => {
                output.error(&format!("{}: {err}", file.display()));
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
