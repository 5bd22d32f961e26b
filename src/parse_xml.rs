use crate::archive::Archive;
use crate::constants::CROP_UNITS;
use crate::geometry::AffineMatrix;
use crate::ids::IdSource;
use crate::media::ImagePayload;
use crate::parse_rels::RelationshipTable;
use crate::parser_config::ParserConfig;
use crate::style::{read_color, read_stroke, solid_fill};
use crate::text::extract_text_body;
use crate::transform::Xfrm;
use crate::types::{
    Crop, GroupContent, ImageContent, ObjectKind, ParseDiagnostics, ShapeContent, Theme, VisualObject,
};
use crate::xml_util::{attr, bool_attr, child, child_path, is_element, number_attr};
use crate::{Error, Result};
use roxmltree::Node;

/// What a shape-tree node turns into, decided by probing its substructure.
///
/// Leaf variants carry the node that triggered the match so extraction never has to look it up twice.
#[derive(Debug, Clone, Copy)]
pub(crate) enum NodeKind<'a, 'input> {
    Group,
    Text { tx_body: Node<'a, 'input> },
    Image { blip: Node<'a, 'input> },
    Shape,
}

/// Classifies a shape-tree element. First match wins: group, text body, embedded image, shape.
///
/// Returns `None` for elements that are not drawable shapes (`nvGrpSpPr`, `grpSpPr`, `extLst`, ...).
pub(crate) fn classify<'a, 'input>(node: Node<'a, 'input>) -> Option<NodeKind<'a, 'input>> {
    let name = node.tag_name().name();
    if !matches!(name, "sp" | "pic" | "cxnSp" | "grpSp") {
        return None;
    }

    if name == "grpSp" || child(node, "grpSpPr").is_some() {
        return Some(NodeKind::Group);
    }

    if let Some(tx_body) = child(node, "txBody") {
        return Some(NodeKind::Text { tx_body });
    }

    if let Some(blip) = node
        .descendants()
        .find(|n| is_element(n, "blip") && attr(*n, "embed").is_some())
    {
        return Some(NodeKind::Image { blip });
    }

    Some(NodeKind::Shape)
}

/// Non-visual properties shared by all shape kinds (`p:nvSpPr`, `p:nvPicPr`, ...).
#[derive(Debug, Default)]
struct NonVisual {
    name: String,
    source_id: Option<u32>,
    hidden: bool,
    placeholder: Option<String>,
}

impl NonVisual {
    fn read(node: Node, diagnostics: &mut ParseDiagnostics) -> Self {
        let Some(nv) = node
            .children()
            .find(|n| n.is_element() && n.tag_name().name().starts_with("nv"))
        else {
            return Self::default();
        };

        let mut props = Self {
            placeholder: child_path(nv, &["nvPr", "ph"])
                .map(|ph| attr(ph, "type").unwrap_or("obj").to_string()),
            ..Self::default()
        };

        if let Some(c_nv_pr) = child(nv, "cNvPr") {
            props.name = attr(c_nv_pr, "name").unwrap_or_default().to_string();
            props.source_id = number_attr::<u32>(c_nv_pr, "id", diagnostics);
            props.hidden = bool_attr(c_nv_pr, "hidden").unwrap_or(false);
        }

        props
    }
}

/// Depth-first walk over one slide's shape tree.
///
/// The accumulated matrix is passed by value into every recursive call; the walker itself only
/// carries the per-slide z-index counter and diagnostics.
pub(crate) struct ShapeWalker<'a> {
    archive: &'a dyn Archive,
    rels: &'a RelationshipTable,
    theme: Option<&'a Theme>,
    config: &'a ParserConfig,
    ids: &'a IdSource,
    next_z: u32,
    pub diagnostics: ParseDiagnostics,
}

impl<'a> ShapeWalker<'a> {
    pub fn new(
        archive: &'a dyn Archive,
        rels: &'a RelationshipTable,
        theme: Option<&'a Theme>,
        config: &'a ParserConfig,
        ids: &'a IdSource,
    ) -> Self {
        Self {
            archive,
            rels,
            theme,
            config,
            ids,
            next_z: 0,
            diagnostics: ParseDiagnostics::default(),
        }
    }

    pub fn theme(&self) -> Option<&'a Theme> {
        self.theme
    }

    /// Walks a `p:spTree` and returns its objects in document order, starting from the identity
    /// transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NestingTooDeep`] when groups nest deeper than the configured limit.
    pub fn walk(&mut self, sp_tree: Node) -> Result<Vec<VisualObject>> {
        let mut objects = Vec::new();
        self.walk_children(sp_tree, AffineMatrix::identity(), 0, &mut objects)?;
        Ok(objects)
    }

    fn walk_children(
        &mut self,
        parent: Node,
        accumulated: AffineMatrix,
        depth: usize,
        out: &mut Vec<VisualObject>,
    ) -> Result<()> {
        for node in parent.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "AlternateContent" => {
                    if let Some(fallback) = child(node, "Fallback") {
                        let depth = self.descend(depth)?;
                        self.walk_children(fallback, accumulated, depth, out)?;
                    }
                }
                "graphicFrame" | "contentPart" => {
                    log::debug!("Skipping unsupported <{}>", node.tag_name().name());
                    self.diagnostics.unsupported_nodes += 1;
                }
                _ => match classify(node) {
                    Some(NodeKind::Group) => self.visit_group(node, accumulated, depth, out)?,
                    Some(leaf) => {
                        let object = self.extract_leaf(node, leaf, accumulated);
                        out.push(object);
                    }
                    None => {}
                },
            }
        }
        Ok(())
    }

    fn visit_group(
        &mut self,
        node: Node,
        accumulated: AffineMatrix,
        depth: usize,
        out: &mut Vec<VisualObject>,
    ) -> Result<()> {
        let depth = self.descend(depth)?;

        let xfrm = Xfrm::read(child_path(node, &["grpSpPr", "xfrm"]), &mut self.diagnostics);
        let child_space = accumulated.compose(&xfrm.child_space_matrix());

        if self.config.flatten_groups {
            return self.walk_children(node, child_space, depth, out);
        }

        let nv = NonVisual::read(node, &mut self.diagnostics);
        let z_index = self.next_z_index();
        let geometry = xfrm.place(accumulated);

        let mut children = Vec::new();
        self.walk_children(node, child_space, depth, &mut children)?;

        out.push(VisualObject {
            id: self.ids.next("group"),
            name: nv.name,
            source_id: nv.source_id,
            z_index,
            rotation_deg: xfrm.rotation,
            flip_h: xfrm.flip_h,
            flip_v: xfrm.flip_v,
            hidden: nv.hidden,
            placeholder: nv.placeholder,
            geometry,
            kind: ObjectKind::Group(GroupContent { children }),
        });
        Ok(())
    }

    fn extract_leaf(&mut self, node: Node, kind: NodeKind, accumulated: AffineMatrix) -> VisualObject {
        let nv = NonVisual::read(node, &mut self.diagnostics);
        let sp_pr = child(node, "spPr");
        let xfrm = Xfrm::read(sp_pr.and_then(|sp_pr| child(sp_pr, "xfrm")), &mut self.diagnostics);
        let z_index = self.next_z_index();
        let geometry = xfrm.place(accumulated);

        let kind = match kind {
            NodeKind::Text { tx_body } => {
                ObjectKind::Text(extract_text_body(tx_body, self.theme, &mut self.diagnostics))
            }
            NodeKind::Image { blip } => ObjectKind::Image(self.extract_image(blip)),
            NodeKind::Shape | NodeKind::Group => ObjectKind::Shape(self.extract_shape(node, sp_pr)),
        };

        VisualObject {
            id: self.ids.next(kind.label()),
            name: nv.name,
            source_id: nv.source_id,
            z_index,
            rotation_deg: xfrm.rotation,
            flip_h: xfrm.flip_h,
            flip_v: xfrm.flip_v,
            hidden: nv.hidden,
            placeholder: nv.placeholder,
            geometry,
            kind,
        }
    }

    fn extract_image(&mut self, blip: Node) -> ImageContent {
        let crop = blip
            .parent_element()
            .and_then(|blip_fill| child(blip_fill, "srcRect"))
            .map(|src_rect| {
                let mut edge = |name: &str| {
                    number_attr::<f64>(src_rect, name, &mut self.diagnostics).unwrap_or(0.0) / CROP_UNITS
                };
                Crop {
                    left: edge("l"),
                    top: edge("t"),
                    right: edge("r"),
                    bottom: edge("b"),
                }
            });

        let image = attr(blip, "embed").and_then(|embed| self.load_media(embed));
        ImageContent { image, crop }
    }

    fn extract_shape(&mut self, node: Node, sp_pr: Option<Node>) -> ShapeContent {
        let Some(sp_pr) = sp_pr else {
            return ShapeContent::default();
        };

        let fill = if has_explicit_fill(sp_pr) {
            solid_fill(sp_pr, self.theme)
        } else {
            // Without a fill in spPr the shape style's fill reference applies.
            child_path(node, &["style", "fillRef"]).and_then(|fill_ref| read_color(fill_ref, self.theme))
        };

        ShapeContent {
            fill,
            stroke: read_stroke(sp_pr, self.theme, &mut self.diagnostics),
            preset: child(sp_pr, "prstGeom")
                .and_then(|geom| attr(geom, "prst"))
                .map(str::to_string),
        }
    }

    /// Resolves an embed relationship ID against the slide's relationships and reads the target.
    ///
    /// Unresolved IDs and missing media parts yield `None` and are counted, never an error.
    pub fn load_media(&mut self, embed: &str) -> Option<ImagePayload> {
        if !self.config.extract_images {
            return None;
        }

        let Some(target) = self.rels.resolve(embed) else {
            log::warn!("Image relationship {} could not be resolved", embed);
            self.diagnostics.unresolved_references += 1;
            return None;
        };

        match self.archive.read_binary(target) {
            Some(data) => Some(ImagePayload::new(target, data, self.config.read_image_dimensions)),
            None => {
                log::warn!("Image part {} referenced by {} is missing", target, embed);
                self.diagnostics.missing_media += 1;
                None
            }
        }
    }

    /// One nesting level deeper. Groups and `mc:AlternateContent` wrappers both count.
    fn descend(&self, depth: usize) -> Result<usize> {
        let depth = depth + 1;
        if depth > self.config.max_group_depth {
            return Err(Error::NestingTooDeep {
                limit: self.config.max_group_depth,
            });
        }
        Ok(depth)
    }

    fn next_z_index(&mut self) -> u32 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }
}

fn has_explicit_fill(sp_pr: Node) -> bool {
    sp_pr.children().any(|n| {
        n.is_element()
            && matches!(
                n.tag_name().name(),
                "noFill" | "solidFill" | "gradFill" | "blipFill" | "pattFill" | "grpFill"
            )
    })
}
