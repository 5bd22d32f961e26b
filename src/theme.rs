use crate::style::read_color;
use crate::types::Theme;
use crate::xml_util::{attr, child, child_path};
use crate::Result;
use roxmltree::Document;
use std::collections::BTreeMap;

/// Parses a theme part (`ppt/theme/themeN.xml`) into its name, color scheme and font scheme.
pub(crate) fn parse_theme(xml: &str) -> Result<Theme> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let mut theme = Theme {
        name: attr(root, "name").unwrap_or_default().to_string(),
        ..Theme::default()
    };

    let Some(elements) = child(root, "themeElements") else {
        return Ok(theme);
    };

    if let Some(scheme) = child(elements, "clrScheme") {
        let mut colors = BTreeMap::new();
        for slot in scheme.children().filter(|n| n.is_element()) {
            // Slots hold concrete colors, so there is no theme to resolve against yet.
            if let Some(color) = read_color(slot, None) {
                colors.insert(slot.tag_name().name().to_string(), color);
            }
        }
        theme.color_scheme = colors;
    }

    if let Some(fonts) = child(elements, "fontScheme") {
        theme.major_font = child_path(fonts, &["majorFont", "latin"])
            .and_then(|latin| attr(latin, "typeface"))
            .map(str::to_string);
        theme.minor_font = child_path(fonts, &["minorFont", "latin"])
            .and_then(|latin| attr(latin, "typeface"))
            .map(str::to_string);
    }

    Ok(theme)
}
