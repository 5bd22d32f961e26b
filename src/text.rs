use crate::constants::FONT_SIZE_UNITS;
use crate::style::solid_fill;
use crate::types::{Alignment, Bullet, Formatting, Paragraph, ParseDiagnostics, Run, TextContent, Theme};
use crate::xml_util::{attr, bool_attr, child, children, number_attr, text_of};
use roxmltree::Node;

/// Extracts a text body (`p:txBody`) into flattened text and rich paragraphs.
///
/// The flattened text joins the paragraphs with a single `\n` and is trimmed at both ends.
pub(crate) fn extract_text_body(
    tx_body: Node,
    theme: Option<&Theme>,
    diagnostics: &mut ParseDiagnostics,
) -> TextContent {
    let paragraphs: Vec<Paragraph> = children(tx_body, "p")
        .map(|p_node| parse_paragraph(p_node, theme, diagnostics))
        .collect();

    let text = paragraphs
        .iter()
        .map(Paragraph::text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    TextContent { text, paragraphs }
}

/// Parses a paragraph node (`<a:p>`): its properties and the runs, fields and line breaks it
/// contains, in document order.
fn parse_paragraph(p_node: Node, theme: Option<&Theme>, diagnostics: &mut ParseDiagnostics) -> Paragraph {
    let mut paragraph = Paragraph::default();

    if let Some(p_pr) = child(p_node, "pPr") {
        paragraph.alignment = attr(p_pr, "algn").map(parse_alignment).unwrap_or_default();
        paragraph.level = number_attr::<u32>(p_pr, "lvl", diagnostics).unwrap_or(0);
        paragraph.bullet = parse_bullet(p_pr, diagnostics);
    }

    for node in p_node.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "r" | "fld" => paragraph.runs.push(parse_run(node, theme, diagnostics)),
            "br" => paragraph.runs.push(Run {
                text: "\n".to_string(),
                formatting: child(node, "rPr")
                    .map(|r_pr| parse_formatting(r_pr, theme, diagnostics))
                    .unwrap_or_default(),
            }),
            _ => {}
        }
    }

    paragraph
}

fn parse_alignment(value: &str) -> Alignment {
    match value {
        "ctr" => Alignment::Center,
        "r" => Alignment::Right,
        "just" | "justLow" => Alignment::Justify,
        "dist" | "thaiDist" => Alignment::Distributed,
        _ => Alignment::Left,
    }
}

/// Bullet descriptor of a paragraph: auto-numbered, literal character, or none.
fn parse_bullet(p_pr: Node, diagnostics: &mut ParseDiagnostics) -> Option<Bullet> {
    if child(p_pr, "buNone").is_some() {
        return None;
    }

    if let Some(auto_num) = child(p_pr, "buAutoNum") {
        return Some(Bullet::AutoNumber {
            scheme: attr(auto_num, "type").unwrap_or("arabicPeriod").to_string(),
            start_at: number_attr::<u32>(auto_num, "startAt", diagnostics).unwrap_or(1),
        });
    }

    child(p_pr, "buChar").map(|bu_char| Bullet::Char {
        character: attr(bu_char, "char").unwrap_or_default().to_string(),
    })
}

/// Parses a run (`<a:r>`) or field (`<a:fld>`): the text of its `<a:t>` and its run properties.
fn parse_run(r_node: Node, theme: Option<&Theme>, diagnostics: &mut ParseDiagnostics) -> Run {
    let formatting = child(r_node, "rPr")
        .map(|r_pr| parse_formatting(r_pr, theme, diagnostics))
        .unwrap_or_default();

    let text = child(r_node, "t").map(text_of).unwrap_or_default().to_string();

    Run { text, formatting }
}

/// Reads _bold_, _italic_, _underlined_, the font family, size in points, color and language
/// from a run properties node (`<a:rPr>`).
fn parse_formatting(r_pr: Node, theme: Option<&Theme>, diagnostics: &mut ParseDiagnostics) -> Formatting {
    let font_family = ["latin", "ea", "cs"]
        .iter()
        .filter_map(|font| child(r_pr, font))
        .filter_map(|font| attr(font, "typeface"))
        .find(|typeface| !typeface.is_empty())
        .map(str::to_string);

    Formatting {
        bold: bool_attr(r_pr, "b").unwrap_or(false),
        italic: bool_attr(r_pr, "i").unwrap_or(false),
        underlined: attr(r_pr, "u").map(is_underlined).unwrap_or(false),
        font_family,
        size: number_attr::<f64>(r_pr, "sz", diagnostics).map(|sz| sz / FONT_SIZE_UNITS),
        color: solid_fill(r_pr, theme),
        lang: attr(r_pr, "lang").map(str::to_string),
    }
}

/// `u` takes an underline style (`sng`, `dbl`, ...); `none`, `0` and `false` mean no underline.
fn is_underlined(value: &str) -> bool {
    !matches!(value, "none" | "0" | "false" | "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn extract(xml: &str) -> (TextContent, ParseDiagnostics) {
        let doc = Document::parse(xml).unwrap();
        let mut diagnostics = ParseDiagnostics::default();
        let content = extract_text_body(doc.root_element(), None, &mut diagnostics);
        (content, diagnostics)
    }

    #[test]
    fn test_two_paragraphs_flatten_with_single_newline() {
        let (content, _) = extract(
            r#"<p:txBody xmlns:p="urn:p" xmlns:a="urn:a">
                <a:bodyPr/>
                <a:p><a:r><a:t>First</a:t></a:r></a:p>
                <a:p><a:r><a:t>Second</a:t></a:r></a:p>
            </p:txBody>"#,
        );

        assert_eq!(content.text, "First\nSecond");
        assert_eq!(content.paragraphs.len(), 2);
    }

    #[test]
    fn test_flattened_text_is_trimmed() {
        let (content, _) = extract(
            r#"<txBody><p/><p><r><t>  middle </t></r></p><p/></txBody>"#,
        );
        assert_eq!(content.text, "middle");
        assert_eq!(content.paragraphs.len(), 3);
    }

    #[test]
    fn test_run_formatting() {
        let (content, diagnostics) = extract(
            r#"<p:txBody xmlns:p="urn:p" xmlns:a="urn:a"><a:p>
                <a:r>
                    <a:rPr lang="en-US" sz="2400" b="1" i="true" u="sng">
                        <a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill>
                        <a:latin typeface="Segoe UI"/>
                    </a:rPr>
                    <a:t>Styled</a:t>
                </a:r>
                <a:r><a:rPr b="0" u="none"/><a:t> plain</a:t></a:r>
            </a:p></p:txBody>"#,
        );

        let runs = &content.paragraphs[0].runs;
        assert_eq!(
            runs[0].formatting,
            Formatting {
                bold: true,
                italic: true,
                underlined: true,
                font_family: Some("Segoe UI".into()),
                size: Some(24.0),
                color: Some("#1F4E79".into()),
                lang: Some("en-US".into()),
            }
        );
        assert_eq!(runs[1].formatting, Formatting::default());
        assert_eq!(content.text, "Styled plain");
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn test_paragraph_properties_and_bullets() {
        let (content, _) = extract(
            r#"<p:txBody xmlns:p="urn:p" xmlns:a="urn:a">
                <a:p><a:pPr algn="ctr" lvl="1"><a:buAutoNum type="romanLcPeriod" startAt="3"/></a:pPr><a:r><a:t>one</a:t></a:r></a:p>
                <a:p><a:pPr algn="r"><a:buChar char="•"/></a:pPr><a:r><a:t>two</a:t></a:r></a:p>
                <a:p><a:pPr algn="just"><a:buNone/></a:pPr><a:r><a:t>three</a:t></a:r></a:p>
                <a:p><a:r><a:t>four</a:t></a:r></a:p>
            </p:txBody>"#,
        );

        let p = &content.paragraphs;
        assert_eq!(p[0].alignment, Alignment::Center);
        assert_eq!(p[0].level, 1);
        assert_eq!(
            p[0].bullet,
            Some(Bullet::AutoNumber { scheme: "romanLcPeriod".into(), start_at: 3 })
        );
        assert_eq!(p[1].alignment, Alignment::Right);
        assert_eq!(p[1].bullet, Some(Bullet::Char { character: "•".into() }));
        assert_eq!(p[2].alignment, Alignment::Justify);
        assert_eq!(p[2].bullet, None);
        assert_eq!(p[3].alignment, Alignment::Left);
        assert_eq!(p[3].bullet, None);
    }

    #[test]
    fn test_fields_and_line_breaks() {
        let (content, _) = extract(
            r#"<p:txBody xmlns:p="urn:p" xmlns:a="urn:a"><a:p>
                <a:r><a:t>Page </a:t></a:r>
                <a:fld id="{1}" type="slidenum"><a:t>4</a:t></a:fld>
                <a:br/>
                <a:r><a:t>next line</a:t></a:r>
                <a:endParaRPr lang="en-US"/>
            </a:p></p:txBody>"#,
        );

        assert_eq!(content.text, "Page 4\nnext line");
        assert_eq!(content.paragraphs[0].runs.len(), 4);
    }

    #[test]
    fn test_malformed_size_is_counted_and_omitted() {
        let (content, diagnostics) = extract(
            r#"<txBody><p><r><rPr sz="large"/><t>x</t></r></p></txBody>"#,
        );
        assert_eq!(content.paragraphs[0].runs[0].formatting.size, None);
        assert_eq!(diagnostics.malformed_values, 1);
    }
}
