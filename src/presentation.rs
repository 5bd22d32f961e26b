use crate::archive::Archive;
use crate::constants::{
    CORE_PROPERTIES_REL_SUFFIX, DEFAULT_CORE_PROPS_PATH, DEFAULT_PRESENTATION_PATH, DEFAULT_SLIDE_HEIGHT_EMU,
    DEFAULT_SLIDE_WIDTH_EMU, OFFICE_DOCUMENT_REL_SUFFIX, SLIDES_DIR_PREFIX, THEME_REL_SUFFIX,
};
use crate::geometry::emu_to_px;
use crate::ids::IdSource;
use crate::parse_rels::RelationshipTable;
use crate::parser_config::ParserConfig;
use crate::slide::{assemble_slide, SlideContext};
use crate::theme::parse_theme;
use crate::types::{ParseDiagnostics, PresentationDocument, PresentationMetadata, SkippedSlide, Slide, SlideSize, Theme};
use crate::xml_util::{attr, child, number_attr, rel_attr, text_of};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rayon::prelude::*;
use roxmltree::Document;

const DEFAULT_DOCUMENT_NAME: &str = "Imported Presentation";

/// One entry of the presentation's slide list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SlideRef {
    /// 1-based position in presentation order.
    pub slide_number: u32,
    /// `sldId@r:id`, empty for slides found by enumerating the package.
    pub rel_id: String,
    /// `None` when the relationship does not resolve.
    pub part_path: Option<String>,
}

/// Document-level parts read before any slide: slide list, slide size, theme and core properties.
#[derive(Debug, Clone, Default)]
pub(crate) struct PresentationIndex {
    pub slides: Vec<SlideRef>,
    pub metadata: PresentationMetadata,
    pub diagnostics: ParseDiagnostics,
}

impl PresentationIndex {
    /// Reads the document-level parts of a package. Problems are logged and recovered from.
    pub fn load(archive: &dyn Archive) -> Self {
        let mut index = Self::default();

        let root_rels = load_rels_or_empty(archive, "");
        let presentation_path = root_rels
            .find_by_type_suffix(OFFICE_DOCUMENT_REL_SUFFIX)
            .map(|rel| rel.target.clone())
            .unwrap_or_else(|| DEFAULT_PRESENTATION_PATH.to_string());
        let core_path = root_rels
            .find_by_type_suffix(CORE_PROPERTIES_REL_SUFFIX)
            .map(|rel| rel.target.clone())
            .unwrap_or_else(|| DEFAULT_CORE_PROPS_PATH.to_string());

        index.metadata.slide_size = default_slide_size();

        match archive.read_text(&presentation_path) {
            Some(xml) => {
                if let Err(e) = index.read_presentation(archive, &presentation_path, &xml) {
                    log::warn!("Presentation part {} is unreadable: {}", presentation_path, e);
                    index.slides.clear();
                }
            }
            None => log::warn!("Presentation part {} is missing", presentation_path),
        }

        if index.slides.is_empty() {
            index.slides = enumerate_slide_parts(archive);
            if !index.slides.is_empty() {
                log::info!("Enumerated {} slide parts from the package", index.slides.len());
            }
        }

        if let Some(xml) = archive.read_text(&core_path) {
            if let Err(e) = read_core_properties(&xml, &mut index.metadata, &mut index.diagnostics) {
                log::warn!("Core properties {} are unreadable: {}", core_path, e);
            }
        }

        index
    }

    fn read_presentation(&mut self, archive: &dyn Archive, path: &str, xml: &str) -> Result<()> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        let rels = load_rels_or_empty(archive, path);
        if rels.is_empty() {
            log::debug!("Presentation part {} has no relationships", path);
        }

        if let Some(sld_sz) = child(root, "sldSz") {
            let width_emu = number_attr::<i64>(sld_sz, "cx", &mut self.diagnostics).unwrap_or(DEFAULT_SLIDE_WIDTH_EMU);
            let height_emu = number_attr::<i64>(sld_sz, "cy", &mut self.diagnostics).unwrap_or(DEFAULT_SLIDE_HEIGHT_EMU);
            self.metadata.slide_size = SlideSize {
                width: emu_to_px(width_emu as f64),
                height: emu_to_px(height_emu as f64),
                width_emu,
                height_emu,
                kind: attr(sld_sz, "type").map(str::to_string),
            };
        }

        if let Some(sld_id_lst) = child(root, "sldIdLst") {
            self.slides = sld_id_lst
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "sldId")
                .enumerate()
                .map(|(i, sld_id)| {
                    let rel_id = rel_attr(sld_id, "id").unwrap_or_default().to_string();
                    SlideRef {
                        slide_number: i as u32 + 1,
                        part_path: rels.resolve(&rel_id).map(str::to_string),
                        rel_id,
                    }
                })
                .collect();
        }

        self.metadata.theme = rels
            .find_by_type_suffix(THEME_REL_SUFFIX)
            .and_then(|rel| load_theme(archive, &rel.target));

        Ok(())
    }

    fn theme(&self) -> Option<&Theme> {
        self.metadata.theme.as_ref()
    }

    pub fn find(&self, slide_number: u32) -> Option<&SlideRef> {
        self.slides.iter().find(|slide| slide.slide_number == slide_number)
    }

    /// Assembles one listed slide.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedRelationship`] when the slide's relationship has no target, and
    /// any error of the slide assembly itself.
    pub fn assemble(
        &self,
        archive: &dyn Archive,
        config: &ParserConfig,
        ids: &IdSource,
        slide: &SlideRef,
    ) -> Result<(Slide, ParseDiagnostics)> {
        let part_path = slide
            .part_path
            .as_deref()
            .ok_or_else(|| Error::UnresolvedRelationship(slide.rel_id.clone()))?;

        let ctx = SlideContext {
            archive,
            config,
            ids,
            theme: self.theme(),
            slide_size: &self.metadata.slide_size,
        };
        assemble_slide(&ctx, part_path, slide.slide_number)
    }
}

/// Builds the whole document. Slides that fail are recorded as skipped and never abort the parse.
pub(crate) fn assemble_document(
    archive: &dyn Archive,
    index: &PresentationIndex,
    config: &ParserConfig,
    name: Option<&str>,
) -> PresentationDocument {
    let ids = IdSource::new(config.id_strategy);
    let id = ids.next("presentation");

    let assemble = |slide: &SlideRef| index.assemble(archive, config, &ids, slide);
    let results: Vec<_> = if config.multi_threaded {
        index.slides.par_iter().map(assemble).collect()
    } else {
        index.slides.iter().map(assemble).collect()
    };

    let mut diagnostics = index.diagnostics.clone();
    let mut slides = Vec::with_capacity(results.len());
    for (slide_ref, result) in index.slides.iter().zip(results) {
        match result {
            Ok((slide, slide_diagnostics)) => {
                diagnostics.merge(slide_diagnostics);
                slides.push(slide);
            }
            Err(e) => {
                log::warn!("Skipping slide {}: {}", slide_ref.slide_number, e);
                diagnostics.skipped_slides.push(SkippedSlide {
                    slide_number: slide_ref.slide_number,
                    part_path: slide_ref.part_path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut metadata = index.metadata.clone();
    metadata.slide_count = slides.len();

    log::info!(
        "Parsed {} slides ({} skipped, {} unresolved references, {} missing media)",
        slides.len(),
        diagnostics.skipped_slides.len(),
        diagnostics.unresolved_references,
        diagnostics.missing_media
    );

    let name = name
        .map(str::to_string)
        .or_else(|| metadata.title.clone().filter(|title| !title.is_empty()))
        .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());

    PresentationDocument {
        id,
        name,
        slides,
        metadata,
        diagnostics,
    }
}

fn load_rels_or_empty(archive: &dyn Archive, owner_part: &str) -> RelationshipTable {
    RelationshipTable::load(archive, owner_part).unwrap_or_else(|e| {
        log::warn!("Relationships of {:?} are unreadable: {}", owner_part, e);
        RelationshipTable::default()
    })
}

fn load_theme(archive: &dyn Archive, path: &str) -> Option<Theme> {
    let xml = archive.read_text(path)?;
    parse_theme(&xml)
        .map_err(|e| log::warn!("Theme {} is unreadable: {}", path, e))
        .ok()
}

fn default_slide_size() -> SlideSize {
    SlideSize {
        width: emu_to_px(DEFAULT_SLIDE_WIDTH_EMU as f64),
        height: emu_to_px(DEFAULT_SLIDE_HEIGHT_EMU as f64),
        width_emu: DEFAULT_SLIDE_WIDTH_EMU,
        height_emu: DEFAULT_SLIDE_HEIGHT_EMU,
        kind: None,
    }
}

/// Slide parts `ppt/slides/slideN.xml` in numeric order, for packages without a usable slide list.
fn enumerate_slide_parts(archive: &dyn Archive) -> Vec<SlideRef> {
    let mut numbered: Vec<(u32, String)> = archive
        .list_entries()
        .into_iter()
        .filter(|path| path.starts_with(SLIDES_DIR_PREFIX) && path.ends_with(".xml"))
        .filter_map(|path| Slide::extract_slide_number(&path).map(|n| (n, path)))
        .collect();
    numbered.sort();

    numbered
        .into_iter()
        .enumerate()
        .map(|(i, (_, path))| SlideRef {
            slide_number: i as u32 + 1,
            rel_id: String::new(),
            part_path: Some(path),
        })
        .collect()
}

/// Reads `docProps/core.xml` (Dublin Core plus OPC core properties) into the metadata.
fn read_core_properties(xml: &str, metadata: &mut PresentationMetadata, diagnostics: &mut ParseDiagnostics) -> Result<()> {
    let doc = Document::parse(xml)?;

    for node in doc.root_element().children().filter(|n| n.is_element()) {
        let value = text_of(node).trim();
        if value.is_empty() {
            continue;
        }

        match node.tag_name().name() {
            "title" => metadata.title = Some(value.to_string()),
            "subject" => metadata.subject = Some(value.to_string()),
            "creator" => metadata.author = Some(value.to_string()),
            "keywords" => metadata.keywords = Some(value.to_string()),
            "description" => metadata.description = Some(value.to_string()),
            "category" => metadata.category = Some(value.to_string()),
            "lastModifiedBy" => metadata.last_modified_by = Some(value.to_string()),
            "revision" => metadata.revision = parse_or_count(value, diagnostics, |v| v.parse().ok()),
            "created" => metadata.created = parse_or_count(value, diagnostics, parse_timestamp),
            "modified" => metadata.modified = parse_or_count(value, diagnostics, parse_timestamp),
            _ => {}
        }
    }

    Ok(())
}

fn parse_or_count<T>(value: &str, diagnostics: &mut ParseDiagnostics, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() {
        log::debug!("Ignoring malformed core property value {:?}", value);
        diagnostics.malformed_values += 1;
    }
    parsed
}

/// W3CDTF timestamps; a missing zone designator is taken as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.and_utc()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Package;
    use crate::parser_config::IdStrategy;
    use chrono::TimeZone;

    const PRESENTATION: &str = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
        <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/><p:sldId id="258" r:id="rId9"/></p:sldIdLst>
        <p:sldSz cx="12192000" cy="6858000" type="custom"/>
    </p:presentation>"#;

    const CORE: &str = r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
        <dc:title>Quarterly Review</dc:title>
        <dc:creator>Jane Doe</dc:creator>
        <cp:lastModifiedBy>John Roe</cp:lastModifiedBy>
        <cp:revision>7</cp:revision>
        <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:30:00Z</dcterms:created>
        <dcterms:modified xsi:type="dcterms:W3CDTF">not a date</dcterms:modified>
    </cp:coreProperties>"#;

    fn presentation_rels() -> String {
        std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/test_data/xml/presentation_rels.xml"))
            .unwrap()
    }

    #[test]
    fn test_slide_list_follows_presentation_order() {
        let package = Package::from_entries([
            ("ppt/presentation.xml", PRESENTATION.as_bytes().to_vec()),
            ("ppt/_rels/presentation.xml.rels", presentation_rels().into_bytes()),
        ]);
        let index = PresentationIndex::load(&package);

        let paths: Vec<_> = index.slides.iter().map(|s| s.part_path.as_deref()).collect();
        assert_eq!(
            paths,
            vec![Some("ppt/slides/slide2.xml"), Some("ppt/slides/slide1.xml"), None]
        );
        assert_eq!(index.slides[2].slide_number, 3);
        assert_eq!(index.slides[2].rel_id, "rId9");

        let size = &index.metadata.slide_size;
        assert_eq!((size.width, size.height), (1280.0, 720.0));
        assert_eq!(size.kind.as_deref(), Some("custom"));
    }

    #[test]
    fn test_defaults_without_presentation_part() {
        let package = Package::from_entries([
            ("ppt/slides/slide10.xml", b"<sld/>".to_vec()),
            ("ppt/slides/slide2.xml", b"<sld/>".to_vec()),
            ("ppt/slides/_rels/slide2.xml.rels", b"<Relationships/>".to_vec()),
            ("ppt/slideLayouts/slideLayout1.xml", b"<sldLayout/>".to_vec()),
        ]);
        let index = PresentationIndex::load(&package);

        let paths: Vec<_> = index.slides.iter().filter_map(|s| s.part_path.as_deref()).collect();
        assert_eq!(paths, vec!["ppt/slides/slide2.xml", "ppt/slides/slide10.xml"]);
        assert_eq!((index.metadata.slide_size.width, index.metadata.slide_size.height), (960.0, 720.0));
        assert!(index.metadata.theme.is_none());
        assert!(index.metadata.author.is_none());
    }

    #[test]
    fn test_core_properties() {
        let mut metadata = PresentationMetadata::default();
        let mut diagnostics = ParseDiagnostics::default();
        read_core_properties(CORE, &mut metadata, &mut diagnostics).unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Quarterly Review"));
        assert_eq!(metadata.author.as_deref(), Some("Jane Doe"));
        assert_eq!(metadata.last_modified_by.as_deref(), Some("John Roe"));
        assert_eq!(metadata.revision, Some(7));
        assert_eq!(metadata.created, Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()));
        assert_eq!(metadata.modified, None);
        assert_eq!(diagnostics.malformed_values, 1);
    }

    #[test]
    fn test_timestamp_without_zone_is_utc() {
        assert_eq!(
            parse_timestamp("2023-12-31T23:59:59"),
            Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-01-01T02:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unresolved_slide_is_skipped() {
        let package = Package::from_entries([
            ("ppt/presentation.xml", PRESENTATION.as_bytes().to_vec()),
            ("ppt/_rels/presentation.xml.rels", presentation_rels().into_bytes()),
        ]);
        let index = PresentationIndex::load(&package);
        let config = ParserConfig::builder().id_strategy(IdStrategy::Sequential).build();

        let document = assemble_document(&package, &index, &config, Some("deck"));
        assert_eq!(document.id, "presentation-1");
        assert_eq!(document.name, "deck");
        assert!(document.slides.is_empty());
        assert_eq!(document.diagnostics.skipped_slides.len(), 3);
        assert_eq!(document.diagnostics.skipped_slides[2].part_path, None);
        assert_eq!(document.metadata.slide_count, 0);
    }
}
