use crate::geometry::emu_to_px;
use crate::types::{ParseDiagnostics, Stroke, Theme};
use crate::xml_util::{attr, child, number_attr};
use roxmltree::Node;

/// Resolves the color child of a fill-like element (`a:solidFill`, `p:bgRef`, ...) to `#RRGGBB`.
///
/// Scheme colors are looked up in the presentation theme; anything else that cannot be resolved
/// to a concrete value yields `None`.
pub(crate) fn read_color(parent: Node, theme: Option<&Theme>) -> Option<String> {
    parent.children().filter(|n| n.is_element()).find_map(|node| {
        match node.tag_name().name() {
            "srgbClr" => attr(node, "val").and_then(normalize_hex),
            "sysClr" => attr(node, "lastClr").and_then(normalize_hex),
            "schemeClr" => {
                let slot = attr(node, "val")?;
                let resolved = theme.and_then(|theme| scheme_color(theme, slot));
                if resolved.is_none() {
                    log::debug!("Unresolved scheme color {}", slot);
                }
                resolved
            }
            _ => None,
        }
    })
}

fn scheme_color(theme: &Theme, slot: &str) -> Option<String> {
    let slot = match slot {
        "tx1" => "dk1",
        "bg1" => "lt1",
        "tx2" => "dk2",
        "bg2" => "lt2",
        other => other,
    };
    theme.color_scheme.get(slot).cloned()
}

fn normalize_hex(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_uppercase()))
    } else {
        None
    }
}

/// Color of a direct `a:solidFill` child, if any.
pub(crate) fn solid_fill(parent: Node, theme: Option<&Theme>) -> Option<String> {
    child(parent, "solidFill").and_then(|fill| read_color(fill, theme))
}

/// Stroke from the `a:ln` child of shape properties.
///
/// No `a:ln` or an explicit `a:noFill` line means no stroke. A line without a width attribute
/// has width zero.
pub(crate) fn read_stroke(
    sp_pr: Node,
    theme: Option<&Theme>,
    diagnostics: &mut ParseDiagnostics,
) -> Option<Stroke> {
    let ln = child(sp_pr, "ln")?;
    if child(ln, "noFill").is_some() {
        return None;
    }

    let width = number_attr::<i64>(ln, "w", diagnostics)
        .map(|w| emu_to_px(w as f64))
        .unwrap_or(0.0);

    Some(Stroke {
        width,
        color: solid_fill(ln, theme),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;
    use std::collections::BTreeMap;

    fn theme() -> Theme {
        Theme {
            name: "Office".into(),
            color_scheme: BTreeMap::from([
                ("dk1".to_string(), "#000000".to_string()),
                ("accent1".to_string(), "#4472C4".to_string()),
            ]),
            ..Theme::default()
        }
    }

    #[test]
    fn test_read_color_variants() {
        let xml = r#"<a:root xmlns:a="urn:a">
            <a:solidFill><a:srgbClr val="ff0000"/></a:solidFill>
            <a:solidFill><a:sysClr val="windowText" lastClr="000000"/></a:solidFill>
            <a:solidFill><a:schemeClr val="accent1"/></a:solidFill>
            <a:solidFill><a:schemeClr val="tx1"/></a:solidFill>
            <a:solidFill><a:schemeClr val="accent6"/></a:solidFill>
            <a:solidFill><a:srgbClr val="nope"/></a:solidFill>
        </a:root>"#;
        let doc = Document::parse(xml).unwrap();
        let theme = theme();
        let colors: Vec<_> = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|fill| read_color(fill, Some(&theme)))
            .collect();

        assert_eq!(
            colors,
            vec![
                Some("#FF0000".to_string()),
                Some("#000000".to_string()),
                Some("#4472C4".to_string()),
                Some("#000000".to_string()),
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_scheme_color_without_theme() {
        let doc = Document::parse(r#"<solidFill><schemeClr val="accent1"/></solidFill>"#).unwrap();
        assert_eq!(read_color(doc.root_element(), None), None);
    }

    #[test]
    fn test_read_stroke() {
        let xml = r#"<p:spPr xmlns:p="urn:p" xmlns:a="urn:a">
            <a:ln w="19050"><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill></a:ln>
        </p:spPr>"#;
        let doc = Document::parse(xml).unwrap();
        let mut diagnostics = ParseDiagnostics::default();
        let stroke = read_stroke(doc.root_element(), None, &mut diagnostics).unwrap();

        assert_eq!(stroke.width, 2.0);
        assert_eq!(stroke.color.as_deref(), Some("#00FF00"));
    }

    #[test]
    fn test_no_fill_line_has_no_stroke() {
        let doc = Document::parse(r#"<spPr><ln w="9525"><noFill/></ln></spPr>"#).unwrap();
        let mut diagnostics = ParseDiagnostics::default();
        assert_eq!(read_stroke(doc.root_element(), None, &mut diagnostics), None);
    }

    #[test]
    fn test_line_without_width_defaults_to_zero() {
        let doc = Document::parse(r#"<spPr><ln/></spPr>"#).unwrap();
        let mut diagnostics = ParseDiagnostics::default();
        let stroke = read_stroke(doc.root_element(), None, &mut diagnostics).unwrap();
        assert_eq!(stroke, Stroke { width: 0.0, color: None });
    }
}
