//! Parses PowerPoint packages (`.pptx`) into a normalized, renderer-agnostic slide model.
//!
//! Every visual object carries its absolute bounding box in pixels: group transforms are folded
//! into their members while parsing, so consumers never deal with nested coordinate systems.
//!
//! ```no_run
//! let bytes = std::fs::read("deck.pptx")?;
//! let document = pptx_model::parse(&bytes)?;
//! for slide in &document.slides {
//!     println!("{}: {} objects", slide.name, slide.objects.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod constants;
mod container;
mod geometry;
mod ids;
mod media;
mod parse_rels;
mod parse_xml;
mod parser_config;
mod presentation;
mod slide;
mod style;
mod text;
mod theme;
mod transform;
mod types;
mod xml_util;

pub use archive::{Archive, Package};
pub use container::{PptxContainer, SlideIterator};
pub use geometry::{emu_to_px, px_to_emu, AffineMatrix, EmuRect, GeometryBox};
pub use media::{mime_from_extension, ImagePayload};
pub use parser_config::{IdStrategy, ParserConfig, ParserConfigBuilder};
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Part not found: {0}")]
    MissingPart(String),

    #[error("Relationship {0:?} does not resolve to a part")]
    UnresolvedRelationship(String),

    #[error("Slide not found")]
    SlideNotFound,

    #[error("Parse error: {0}")]
    ParseError(&'static str),

    #[error("Groups nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a presentation package with the default [`ParserConfig`].
///
/// # Errors
///
/// Only an unreadable package fails the call. Slides that cannot be parsed are reported in
/// [`PresentationDocument::diagnostics`].
pub fn parse(bytes: &[u8]) -> Result<PresentationDocument> {
    PptxContainer::from_bytes(bytes, None, ParserConfig::default()).map(|container| container.parse())
}
