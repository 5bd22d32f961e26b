//! Basic usage example for the pptx-model crate
//!
//! This example opens a PPTX file and prints every slide's objects with their absolute geometry.
//!
//! Run with: cargo run --example basic_usage <path/to/your/presentation.pptx>

use pptx_model::{ObjectKind, ParserConfig, PptxContainer, Result, VisualObject};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let pptx_path = if args.len() > 1 {
        &args[1]
    } else {
        eprintln!("Usage: cargo run --example basic_usage <path/to/presentation.pptx>");
        return Ok(());
    };

    println!("Processing PPTX file: {}", pptx_path);

    let config = ParserConfig::builder()
        .extract_images(true)
        .multi_threaded(true)
        .build();

    let container = PptxContainer::open(Path::new(pptx_path), config)?;
    let document = container.parse();

    println!(
        "{}: {} slides, {}x{} px",
        document.name,
        document.slides.len(),
        document.metadata.slide_size.width,
        document.metadata.slide_size.height
    );

    for slide in &document.slides {
        println!("\n== {} ({}) ==", slide.name, slide.part_path);
        for object in &slide.objects {
            print_object(object, 1);
        }
    }

    for skipped in &document.diagnostics.skipped_slides {
        eprintln!("Skipped slide {}: {}", skipped.slide_number, skipped.reason);
    }

    Ok(())
}

fn print_object(object: &VisualObject, depth: usize) {
    let g = &object.geometry;
    let detail = match &object.kind {
        ObjectKind::Text(text) => format!("{:?}", text.text),
        ObjectKind::Image(image) => image
            .image
            .as_ref()
            .map(|payload| format!("{} ({} bytes)", payload.mime, payload.data.len()))
            .unwrap_or_else(|| "<no payload>".to_string()),
        ObjectKind::Shape(shape) => shape.preset.clone().unwrap_or_default(),
        ObjectKind::Group(group) => format!("{} children", group.children.len()),
    };

    println!(
        "{}#{} {} {:?} at ({:.1}, {:.1}) size {:.1}x{:.1}: {}",
        "  ".repeat(depth),
        object.z_index,
        object.kind.label(),
        object.name,
        g.x,
        g.y,
        g.width,
        g.height,
        detail
    );

    if let ObjectKind::Group(group) = &object.kind {
        for child in &group.children {
            print_object(child, depth + 1);
        }
    }
}
