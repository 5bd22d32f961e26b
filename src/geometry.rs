use crate::constants::EMU_PER_PX;
use serde::Serialize;

/// Converts English Metric Units to pixels at 96 DPI.
#[inline]
pub fn emu_to_px(emu: f64) -> f64 {
    emu / EMU_PER_PX
}

/// Converts pixels at 96 DPI back to English Metric Units.
#[inline]
pub fn px_to_emu(px: f64) -> f64 {
    px * EMU_PER_PX
}

/// A 2-D affine map in row-vector convention.
///
/// A point `(x, y)` maps to `(a·x + c·y + e, b·x + d·y + f)`. Values are never mutated in place;
/// every operation returns a new matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMatrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Clockwise rotation in a y-down coordinate space.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// `translate(cx, cy) ∘ rotate(degrees) ∘ translate(-cx, -cy)`
    pub fn rotate_about_point(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy)
            .compose(&Self::rotate(degrees))
            .compose(&Self::translate(-cx, -cy))
    }

    /// Mirrors horizontally and/or vertically about `(cx, cy)`.
    pub fn mirror_about_point(flip_h: bool, flip_v: bool, cx: f64, cy: f64) -> Self {
        let sx = if flip_h { -1.0 } else { 1.0 };
        let sy = if flip_v { -1.0 } else { 1.0 };
        Self::translate(cx, cy)
            .compose(&Self::scale(sx, sy))
            .compose(&Self::translate(-cx, -cy))
    }

    /// Returns `self ∘ inner`: `inner` is applied first, then `self`.
    pub fn compose(&self, inner: &AffineMatrix) -> AffineMatrix {
        let outer = self;
        AffineMatrix {
            a: inner.a * outer.a + inner.b * outer.c,
            b: inner.a * outer.b + inner.b * outer.d,
            c: inner.c * outer.a + inner.d * outer.c,
            d: inner.c * outer.b + inner.d * outer.d,
            e: inner.e * outer.a + inner.f * outer.c + outer.e,
            f: inner.e * outer.b + inner.f * outer.d + outer.f,
        }
    }

    pub fn apply_to_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transforms the four corners of a rectangle and returns their axis-aligned bounding box
    /// as `(x, y, width, height)`.
    pub fn apply_to_rect(&self, x: f64, y: f64, w: f64, h: f64) -> (f64, f64, f64, f64) {
        let corners = [
            self.apply_to_point(x, y),
            self.apply_to_point(x + w, y),
            self.apply_to_point(x, y + h),
            self.apply_to_point(x + w, y + h),
        ];

        let (mut min_x, mut min_y) = corners[0];
        let (mut max_x, mut max_y) = corners[0];
        for &(px, py) in &corners[1..] {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }

        (min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &AffineMatrix, epsilon: f64) -> bool {
        [
            (self.a, other.a),
            (self.b, other.b),
            (self.c, other.c),
            (self.d, other.d),
            (self.e, other.e),
            (self.f, other.f),
        ]
        .iter()
        .all(|(l, r)| (l - r).abs() <= epsilon * (1.0 + l.abs().max(r.abs())))
    }
}

/// The authored `a:xfrm` rectangle of a node, in EMU, kept for lossless re-export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Absolute-space bounding box in pixels.
///
/// Width and height are never negative; zero-area boxes are valid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GeometryBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub emu: EmuRect,
}

impl GeometryBox {
    /// Builds a pixel box from an absolute EMU-space rectangle.
    pub(crate) fn from_emu_space(rect: (f64, f64, f64, f64), emu: EmuRect) -> Self {
        let (x, y, w, h) = rect;
        Self {
            x: emu_to_px(x),
            y: emu_to_px(y),
            width: emu_to_px(w.max(0.0)),
            height: emu_to_px(h.max(0.0)),
            emu,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}
