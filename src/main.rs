//! PDF Page Recompressor CLI
//!
//! Command-line interface for shrinking a PDF by re-rasterizing its pages.

use clap::Parser;
use recompress_pdf::file_ops::compress_pdf_file;
use recompress_pdf::{ColorMode, CompressionSettings};
use std::path::PathBuf;

/// Shrink a PDF by re-rasterizing every page at a reduced resolution
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PDF file path
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF file path
    #[arg(short, long)]
    output: PathBuf,

    /// Target render density (72-300)
    #[arg(short, long, default_value = "144")]
    dpi: u32,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value = "75")]
    quality: u8,

    /// Convert the output to grayscale
    #[arg(short, long)]
    gray: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let settings = CompressionSettings {
        dpi: args.dpi,
        image_quality: args.quality,
        color: if args.gray {
            ColorMode::Gray
        } else {
            ColorMode::NoChange
        },
    };

    println!("PDF Page Recompressor");
    println!("=====================");

    let mut progress = |msg: &str| println!("{msg}");
    let result = compress_pdf_file(&args.input, &args.output, settings, &mut progress)?;

    println!(
        "\nDone! {} -> {} bytes ({:.2}% saved)",
        result.original_size, result.new_size, result.percentage_saved
    );
    println!("Output saved to: {:?}", args.output);

    Ok(())
}
