use crate::geometry::GeometryBox;
use crate::media::ImagePayload;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// The normalized result of parsing one presentation package.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDocument {
    pub id: String,
    pub name: String,
    pub slides: Vec<Slide>,
    pub metadata: PresentationMetadata,
    pub diagnostics: ParseDiagnostics,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub name: String,
    /// 1-based position in the presentation's slide list.
    pub slide_number: u32,
    pub part_path: String,
    pub width: f64,
    pub height: f64,
    pub hidden: bool,
    pub objects: Vec<VisualObject>,
    pub background: Background,
}

impl Slide {
    /// Iterates leaf objects in paint order, descending into groups.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self.objects.iter()] }
    }

    /// Plain text of every text object on the slide, one object per line.
    pub fn text(&self) -> String {
        self.leaves()
            .filter_map(|object| match &object.kind {
                ObjectKind::Text(text) if !text.text.is_empty() => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn extract_slide_number(path: &str) -> Option<u32> {
        path.split('/')
            .last()
            .and_then(|filename| {
                filename
                    .strip_prefix("slide")
                    .and_then(|s| s.strip_suffix(".xml"))
            })
            .and_then(|num_str| num_str.parse::<u32>().ok())
    }
}

/// Depth-first iterator over the leaves of a slide's object tree.
pub struct Leaves<'a> {
    stack: Vec<std::slice::Iter<'a, VisualObject>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a VisualObject;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(object) => match &object.kind {
                    ObjectKind::Group(group) => self.stack.push(group.children.iter()),
                    _ => return Some(object),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Background {
    #[default]
    None,
    Solid { color: String },
    Image { image: Option<ImagePayload> },
}

/// A positioned visual object. Geometry is always in absolute slide space.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualObject {
    pub id: String,
    pub name: String,
    /// `cNvPr@id` of the drawing element, unique only within its slide part.
    pub source_id: Option<u32>,
    pub z_index: u32,
    /// Degrees, clockwise.
    pub rotation_deg: f64,
    pub flip_h: bool,
    pub flip_v: bool,
    pub hidden: bool,
    /// `p:ph@type` when the object is a layout placeholder.
    pub placeholder: Option<String>,
    pub geometry: GeometryBox,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectKind {
    Text(TextContent),
    Image(ImageContent),
    Shape(ShapeContent),
    Group(GroupContent),
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
            ObjectKind::Shape(_) => "shape",
            ObjectKind::Group(_) => "group",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    /// Paragraphs joined by `\n`, trimmed.
    pub text: String,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub alignment: Alignment,
    pub level: u32,
    pub bullet: Option<Bullet>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    Distributed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Bullet {
    /// `a:buAutoNum`, e.g. scheme `arabicPeriod`.
    AutoNumber { scheme: String, start_at: u32 },
    /// `a:buChar`
    Char { character: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub text: String,
    pub formatting: Formatting,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub font_family: Option<String>,
    /// Points.
    pub size: Option<f64>,
    /// `#RRGGBB`
    pub color: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    /// `None` when the reference could not be resolved or the media part is missing.
    pub image: Option<ImagePayload>,
    pub crop: Option<Crop>,
}

/// Fractions of the source image cut from each edge, like `a:srcRect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Crop {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeContent {
    /// `#RRGGBB`
    pub fill: Option<String>,
    pub stroke: Option<Stroke>,
    /// Preset geometry name, e.g. `rect`, `ellipse`, `straightConnector1`.
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Pixels.
    pub width: f64,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupContent {
    /// Already in absolute slide space.
    pub children: Vec<VisualObject>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMetadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub last_modified_by: Option<String>,
    pub revision: Option<u32>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub slide_count: usize,
    pub slide_size: SlideSize,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSize {
    pub width: f64,
    pub height: f64,
    pub width_emu: i64,
    pub height_emu: i64,
    /// `sldSz@type`, e.g. `screen16x9`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    /// Scheme slot (`dk1`, `accent1`, ...) to `#RRGGBB`.
    pub color_scheme: BTreeMap<String, String>,
    pub major_font: Option<String>,
    pub minor_font: Option<String>,
}

/// Recovered problems, counted so partial extraction stays diagnosable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDiagnostics {
    pub skipped_slides: Vec<SkippedSlide>,
    pub unresolved_references: usize,
    pub missing_media: usize,
    pub malformed_values: usize,
    pub unsupported_nodes: usize,
}

impl ParseDiagnostics {
    pub(crate) fn merge(&mut self, other: ParseDiagnostics) {
        self.skipped_slides.extend(other.skipped_slides);
        self.unresolved_references += other.unresolved_references;
        self.missing_media += other.missing_media;
        self.malformed_values += other.malformed_values;
        self.unsupported_nodes += other.unsupported_nodes;
    }

    pub fn is_clean(&self) -> bool {
        *self == ParseDiagnostics::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSlide {
    pub slide_number: u32,
    pub part_path: Option<String>,
    pub reason: String,
}
