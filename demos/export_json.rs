//! Exports the parsed slide model of a PPTX file as JSON.
//!
//! Image payloads are embedded as data URIs unless `--no-images` is given.
//!
//! Run with: cargo run --example export_json <path/to/presentation.pptx> [output.json] [--no-images]

use pptx_model::{IdStrategy, ParserConfig, PptxContainer};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let no_images = args.iter().any(|arg| arg == "--no-images");
    let positional: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();

    let Some(pptx_path) = positional.first() else {
        eprintln!("Usage: cargo run --example export_json <path/to/presentation.pptx> [output.json] [--no-images]");
        return Ok(());
    };
    let output_path = positional.get(1).map(|s| s.as_str()).unwrap_or("output.json");

    let config = ParserConfig::builder()
        .extract_images(!no_images)
        .id_strategy(IdStrategy::Sequential)
        .build();

    let container = PptxContainer::open(Path::new(pptx_path.as_str()), config)?;
    let document = container.parse();

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, &document)?;

    println!(
        "Wrote {} slides to {} ({} skipped)",
        document.slides.len(),
        output_path,
        document.diagnostics.skipped_slides.len()
    );

    Ok(())
}
