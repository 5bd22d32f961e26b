use crate::constants::ROTATION_UNITS_PER_DEGREE;
use crate::geometry::{AffineMatrix, EmuRect, GeometryBox};
use crate::types::ParseDiagnostics;
use crate::xml_util::{bool_attr, child, number_attr};
use roxmltree::Node;

/// The placement of one shape-tree node as authored in its `a:xfrm` (or `p:xfrm`) element.
///
/// Missing or unparsable values default to zero, so an absent transform places a zero-sized
/// node at its parent's origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Xfrm {
    pub off: (i64, i64),
    pub ext: (i64, i64),
    /// Group child-space origin (`a:chOff`).
    pub ch_off: (i64, i64),
    /// Group child-space extent (`a:chExt`).
    pub ch_ext: (i64, i64),
    /// Degrees, clockwise.
    pub rotation: f64,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Xfrm {
    pub fn read(xfrm: Option<Node>, diagnostics: &mut ParseDiagnostics) -> Self {
        let Some(xfrm) = xfrm else {
            return Self::default();
        };

        let point = |name: &str, x: &str, y: &str, diagnostics: &mut ParseDiagnostics| {
            child(xfrm, name)
                .map(|node| {
                    (
                        number_attr::<i64>(node, x, diagnostics).unwrap_or(0),
                        number_attr::<i64>(node, y, diagnostics).unwrap_or(0),
                    )
                })
                .unwrap_or((0, 0))
        };

        let off = point("off", "x", "y", diagnostics);
        let ext = point("ext", "cx", "cy", diagnostics);
        let ch_off = point("chOff", "x", "y", diagnostics);
        let ch_ext = point("chExt", "cx", "cy", diagnostics);

        let rotation = number_attr::<i64>(xfrm, "rot", diagnostics)
            .map(|rot| rot as f64 / ROTATION_UNITS_PER_DEGREE)
            .unwrap_or(0.0);

        Self {
            off,
            ext: (ext.0.max(0), ext.1.max(0)),
            ch_off,
            ch_ext,
            rotation,
            flip_h: bool_attr(xfrm, "flipH").unwrap_or(false),
            flip_v: bool_attr(xfrm, "flipV").unwrap_or(false),
        }
    }

    pub fn emu_rect(&self) -> EmuRect {
        EmuRect {
            x: self.off.0,
            y: self.off.1,
            cx: self.ext.0,
            cy: self.ext.1,
        }
    }

    /// Maps the node's local rectangle `(0, 0, ext)` into its parent's space:
    /// `translate(off) ∘ mirror-about-center ∘ rotate-about-center`.
    pub fn local_matrix(&self) -> AffineMatrix {
        let cx = self.ext.0 as f64 / 2.0;
        let cy = self.ext.1 as f64 / 2.0;

        let mut local = AffineMatrix::translate(self.off.0 as f64, self.off.1 as f64);
        if self.flip_h || self.flip_v {
            local = local.compose(&AffineMatrix::mirror_about_point(self.flip_h, self.flip_v, cx, cy));
        }
        if self.rotation != 0.0 {
            local = local.compose(&AffineMatrix::rotate_about_point(self.rotation, cx, cy));
        }
        local
    }

    /// Maps a group's child space into its parent's space.
    ///
    /// `scale = ext / chExt` per axis (a zero child extent counts as 1) and
    /// `translate = off - chOff·scale`. Group rotation and flips are not part of this mapping.
    pub fn child_space_matrix(&self) -> AffineMatrix {
        let axis = |ext: i64, ch_ext: i64| {
            let denominator = if ch_ext == 0 { 1.0 } else { ch_ext as f64 };
            ext as f64 / denominator
        };
        let sx = axis(self.ext.0, self.ch_ext.0);
        let sy = axis(self.ext.1, self.ch_ext.1);

        let tx = self.off.0 as f64 - self.ch_off.0 as f64 * sx;
        let ty = self.off.1 as f64 - self.ch_off.1 as f64 * sy;

        AffineMatrix::translate(tx, ty).compose(&AffineMatrix::scale(sx, sy))
    }

    /// Absolute bounding box of this node under the inherited matrix.
    pub fn place(&self, inherited: AffineMatrix) -> GeometryBox {
        let absolute = inherited.compose(&self.local_matrix());
        let rect = absolute.apply_to_rect(0.0, 0.0, self.ext.0 as f64, self.ext.1 as f64);
        GeometryBox::from_emu_space(rect, self.emu_rect())
    }
}
