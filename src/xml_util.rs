//! Namespace-agnostic lookups over a `roxmltree` tree.
//!
//! Elements and attributes are matched by their local name, so `p:sp`, `sp` and an `sp` bound to
//! any namespace are the same logical element.

use crate::types::ParseDiagnostics;
use roxmltree::Node;
use std::str::FromStr;

pub(crate) fn is_element(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

/// First direct child element named `local`.
pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, local))
}

/// All direct child elements named `local`, in document order.
pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| is_element(n, local))
}

/// Follows a path of direct children, e.g. `["spPr", "xfrm", "off"]`.
pub(crate) fn child_path<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    path.iter().try_fold(node, |current, local| child(current, local))
}

/// First element named `local` at any depth below `node` (excluding `node` itself).
pub(crate) fn descendant<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|n| is_element(n, local))
}

/// Attribute by local name, ignoring any namespace prefix (`r:embed` == `embed`).
pub(crate) fn attr<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value())
}

/// Relationship-ID attribute (`r:id`, `r:embed`, ...). Unlike [`attr`] this skips an unqualified
/// attribute of the same local name, which `p:sldId` carries next to `r:id`.
pub(crate) fn rel_attr<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local && a.namespace().is_some_and(|ns| ns.ends_with("/relationships")))
        .map(|a| a.value())
}

/// OOXML boolean: `1` or `true`.
pub(crate) fn bool_attr(node: Node, local: &str) -> Option<bool> {
    attr(node, local).map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
}

/// Parses a numeric attribute. An absent attribute is `None`; a present but unparsable one is
/// also `None` and counted as a malformed value.
pub(crate) fn number_attr<T: FromStr>(
    node: Node,
    local: &str,
    diagnostics: &mut ParseDiagnostics,
) -> Option<T> {
    let raw = attr(node, local)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::debug!(
                "Malformed numeric attribute {}=\"{}\" on <{}>",
                local,
                raw,
                node.tag_name().name()
            );
            diagnostics.malformed_values += 1;
            None
        }
    }
}

/// Text of the first text node of an element, or empty.
pub(crate) fn text_of<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}
