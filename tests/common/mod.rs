#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const NS: &str = r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Pixels to EMU.
pub fn px(value: i64) -> i64 {
    value * 9525
}

pub fn zip_package(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(name.as_str(), SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// One slide of a [`DeckBuilder`] deck: the shape-tree content and the slide's own relationships.
#[derive(Default, Clone)]
pub struct SlideFixture {
    pub shapes: String,
    pub background: String,
    /// `(id, target)` image relationships.
    pub images: Vec<(String, String)>,
    /// Replaces the whole slide part when set.
    pub raw_xml: Option<String>,
    /// Lists the slide in the presentation without writing its part.
    pub missing_part: bool,
}

impl SlideFixture {
    pub fn new(shapes: impl Into<String>) -> Self {
        Self {
            shapes: shapes.into(),
            ..Self::default()
        }
    }

    pub fn image(mut self, id: &str, target: &str) -> Self {
        self.images.push((id.to_string(), target.to_string()));
        self
    }

    pub fn background(mut self, bg: &str) -> Self {
        self.background = bg.to_string();
        self
    }
}

/// Builds minimal but well-formed presentation packages in memory.
#[derive(Default)]
pub struct DeckBuilder {
    slides: Vec<SlideFixture>,
    files: Vec<(String, Vec<u8>)>,
    core: Option<String>,
    theme: Option<String>,
    without_presentation: bool,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slide(mut self, slide: SlideFixture) -> Self {
        self.slides.push(slide);
        self
    }

    pub fn file(mut self, path: &str, data: Vec<u8>) -> Self {
        self.files.push((path.to_string(), data));
        self
    }

    pub fn core(mut self, xml: &str) -> Self {
        self.core = Some(xml.to_string());
        self
    }

    pub fn theme(mut self, xml: &str) -> Self {
        self.theme = Some(xml.to_string());
        self
    }

    /// Leaves out `ppt/presentation.xml` and its relationships.
    pub fn without_presentation(mut self) -> Self {
        self.without_presentation = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();
        let mut add = |path: &str, content: String| files.push((path.to_string(), content.into_bytes()));

        add(
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#.to_string(),
        );

        let mut root_rels = vec![relationship(
            "rId1",
            &format!("{REL_NS}/officeDocument"),
            "ppt/presentation.xml",
        )];
        if let Some(core) = &self.core {
            root_rels.push(relationship(
                "rId2",
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
                "docProps/core.xml",
            ));
            add("docProps/core.xml", core.clone());
        }
        add("_rels/.rels", relationships(&root_rels));

        let mut presentation_rels = Vec::new();
        let mut slide_ids = String::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            let rel_id = format!("rId{}", n + 10);
            presentation_rels.push(relationship(&rel_id, &format!("{REL_NS}/slide"), &format!("slides/slide{n}.xml")));
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 255 + n, rel_id));

            if slide.missing_part {
                continue;
            }

            let xml = slide.raw_xml.clone().unwrap_or_else(|| {
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld>{}<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
                    slide.background, slide.shapes
                )
            });
            add(&format!("ppt/slides/slide{n}.xml"), xml);

            let mut slide_rels = vec![relationship(
                "rId1",
                &format!("{REL_NS}/slideLayout"),
                "../slideLayouts/slideLayout1.xml",
            )];
            for (id, target) in &slide.images {
                slide_rels.push(relationship(id, &format!("{REL_NS}/image"), target));
            }
            add(&format!("ppt/slides/_rels/slide{n}.xml.rels"), relationships(&slide_rels));
        }

        if let Some(theme) = &self.theme {
            presentation_rels.push(relationship("rId2", &format!("{REL_NS}/theme"), "theme/theme1.xml"));
            add("ppt/theme/theme1.xml", theme.clone());
        }

        if !self.without_presentation {
            add(
                "ppt/presentation.xml",
                format!(
                    r#"<p:presentation {NS}><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
                ),
            );
            add("ppt/_rels/presentation.xml.rels", relationships(&presentation_rels));
        }

        files.extend(self.files);
        zip_package(&files)
    }
}

fn relationship(id: &str, rel_type: &str, target: &str) -> String {
    format!(r#"<Relationship Id="{id}" Type="{rel_type}" Target="{target}"/>"#)
}

fn relationships(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        entries.concat()
    )
}

fn xfrm(off: (i64, i64), ext: (i64, i64)) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        off.0, off.1, ext.0, ext.1
    )
}

/// A generic rectangle with a solid fill.
pub fn shape(name: &str, off: (i64, i64), ext: (i64, i64)) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="4472C4"/></a:solidFill></p:spPr></p:sp>"#,
        xfrm(off, ext)
    )
}

/// A text box with one run per paragraph.
pub fn text_box(name: &str, off: (i64, i64), ext: (i64, i64), paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|text| format!(r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{text}</a:t></a:r></a:p>"#))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        xfrm(off, ext)
    )
}

pub fn picture(name: &str, embed: &str, off: (i64, i64), ext: (i64, i64)) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="{name}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{embed}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}</p:spPr></p:pic>"#,
        xfrm(off, ext)
    )
}

pub fn group(
    name: &str,
    off: (i64, i64),
    ext: (i64, i64),
    ch_off: (i64, i64),
    ch_ext: (i64, i64),
    children: &str,
) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="5" name="{name}"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/><a:chOff x="{}" y="{}"/><a:chExt cx="{}" cy="{}"/></a:xfrm></p:grpSpPr>{children}</p:grpSp>"#,
        off.0, off.1, ext.0, ext.1, ch_off.0, ch_off.1, ch_ext.0, ch_ext.1
    )
}

/// A small PNG for image payload tests.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::new_rgb8(width, height);
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageOutputFormat::Png).unwrap();
    bytes.into_inner()
}
