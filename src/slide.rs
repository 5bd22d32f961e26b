use crate::archive::Archive;
use crate::ids::IdSource;
use crate::parse_rels::RelationshipTable;
use crate::parse_xml::ShapeWalker;
use crate::parser_config::ParserConfig;
use crate::style::{read_color, solid_fill};
use crate::types::{Background, ParseDiagnostics, Slide, SlideSize, Theme};
use crate::xml_util::{attr, bool_attr, child, descendant};
use crate::{Error, Result};
use roxmltree::{Document, Node};

/// Everything a slide needs from its presentation, shared read-only across slides.
#[derive(Clone, Copy)]
pub(crate) struct SlideContext<'a> {
    pub archive: &'a dyn Archive,
    pub config: &'a ParserConfig,
    pub ids: &'a IdSource,
    pub theme: Option<&'a Theme>,
    pub slide_size: &'a SlideSize,
}

/// Parses one slide part into a [`Slide`] together with the problems recovered while doing so.
///
/// # Errors
///
/// Fails when the part is missing or not well-formed XML, when it has no `p:cSld/p:spTree`,
/// when its relationships part is malformed, or when groups nest too deeply. The caller
/// records such slides as skipped.
pub(crate) fn assemble_slide(
    ctx: &SlideContext,
    part_path: &str,
    slide_number: u32,
) -> Result<(Slide, ParseDiagnostics)> {
    let xml = ctx
        .archive
        .read_text(part_path)
        .ok_or_else(|| Error::MissingPart(part_path.to_string()))?;
    let doc = Document::parse(&xml)?;
    let root = doc.root_element();

    let c_sld = child(root, "cSld").ok_or(Error::ParseError("slide has no <p:cSld>"))?;
    let sp_tree = child(c_sld, "spTree").ok_or(Error::ParseError("slide has no <p:spTree>"))?;

    let rels = RelationshipTable::load(ctx.archive, part_path)?;
    let id = ctx.ids.next("slide");

    let mut walker = ShapeWalker::new(ctx.archive, &rels, ctx.theme, ctx.config, ctx.ids);
    let objects = walker.walk(sp_tree)?;
    let background = read_background(c_sld, &mut walker);

    log::debug!(
        "Slide {} ({}): {} top-level objects, {} relationships",
        slide_number,
        part_path,
        objects.len(),
        rels.len()
    );

    let slide = Slide {
        id,
        name: attr(c_sld, "name")
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Slide {}", slide_number)),
        slide_number,
        part_path: part_path.to_string(),
        width: ctx.slide_size.width,
        height: ctx.slide_size.height,
        hidden: bool_attr(root, "show") == Some(false),
        objects,
        background,
    };

    Ok((slide, walker.diagnostics))
}

/// `p:bg` of the slide itself. Backgrounds inherited from layouts and masters are not followed.
fn read_background(c_sld: Node, walker: &mut ShapeWalker) -> Background {
    let Some(bg) = child(c_sld, "bg") else {
        return Background::None;
    };

    if let Some(bg_pr) = child(bg, "bgPr") {
        if let Some(color) = solid_fill(bg_pr, walker.theme()) {
            return Background::Solid { color };
        }
        if let Some(blip) = child(bg_pr, "blipFill").and_then(|fill| descendant(fill, "blip")) {
            let image = attr(blip, "embed").and_then(|embed| walker.load_media(embed));
            return Background::Image { image };
        }
        return Background::None;
    }

    child(bg, "bgRef")
        .and_then(|bg_ref| read_color(bg_ref, walker.theme()))
        .map(|color| Background::Solid { color })
        .unwrap_or_default()
}
