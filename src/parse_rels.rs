use crate::archive::Archive;
use crate::constants::ROOT_RELS_PATH;
use crate::xml_util::{attr, children};
use crate::Result;
use roxmltree::Document;
use std::collections::HashMap;

/// A single `<Relationship>` entry with its target already resolved to a package path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Package path for internal targets, the verbatim URI for external ones.
    pub target: String,
    pub external: bool,
}

/// Relationship IDs of one part mapped to their targets.
#[derive(Debug, Clone, Default)]
pub(crate) struct RelationshipTable {
    entries: HashMap<String, Relationship>,
    order: Vec<String>,
}

impl RelationshipTable {
    /// Parses relationship (`.rels`) XML belonging to `owner_part`.
    ///
    /// Relative targets are resolved against the owner part's directory; for the package-level
    /// `_rels/.rels` the owner is the package root (`""`).
    ///
    /// # Errors
    ///
    /// Returns an error when the relationship XML is malformed.
    pub fn parse(xml: &str, owner_part: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        let base_dir = part_dir(owner_part);

        let mut table = Self::default();
        for rel in children(root, "Relationship") {
            let (Some(id), Some(target)) = (attr(rel, "Id"), attr(rel, "Target")) else {
                log::debug!("Skipping relationship without Id or Target in rels of {}", owner_part);
                continue;
            };

            let external = attr(rel, "TargetMode") == Some("External");
            let target = if external {
                target.to_string()
            } else {
                resolve_target(base_dir, target)
            };

            table.insert(Relationship {
                id: id.to_string(),
                rel_type: attr(rel, "Type").unwrap_or_default().to_string(),
                target,
                external,
            });
        }

        Ok(table)
    }

    /// Loads the relationship table of `owner_part` from the archive.
    ///
    /// A missing `.rels` part yields an empty table; a malformed one is an error.
    pub fn load(archive: &dyn Archive, owner_part: &str) -> Result<Self> {
        let rels_path = rels_path_for(owner_part);
        match archive.read_text(&rels_path) {
            Some(xml) => Self::parse(&xml, owner_part),
            None => {
                log::debug!("No relationship part {}, using an empty table", rels_path);
                Ok(Self::default())
            }
        }
    }

    fn insert(&mut self, relationship: Relationship) {
        if !self.entries.contains_key(&relationship.id) {
            self.order.push(relationship.id.clone());
        }
        self.entries.insert(relationship.id.clone(), relationship);
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.get(id)
    }

    /// Package path of an internal relationship target.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.get(id)
            .filter(|rel| !rel.external)
            .map(|rel| rel.target.as_str())
    }

    /// First internal relationship whose type URI ends with `suffix`, in document order.
    pub fn find_by_type_suffix(&self, suffix: &str) -> Option<&Relationship> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .find(|rel| !rel.external && rel.rel_type.ends_with(suffix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Path of the relationship part for a given part.
///
/// `ppt/slides/slide1.xml` becomes `ppt/slides/_rels/slide1.xml.rels`, the package root (`""`)
/// becomes `_rels/.rels`.
pub(crate) fn rels_path_for(part: &str) -> String {
    if part.is_empty() {
        return ROOT_RELS_PATH.to_string();
    }
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolves a relationship target against a base directory the way POSIX resolves relative paths:
/// `..` pops a segment, `.` and empty segments are dropped, and a leading `/` anchors the target
/// at the package root.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    let (base, relative) = match target.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (base_dir, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
