use crate::foundation::error::{XflError, XflResult};

pub use kurbo::{Affine, Point, Rect};

/// Edge coordinates are stored in twips: 20 subunits per pixel.
pub const TWIPS_PER_PX: f64 = 20.0;

/// Half-width of the gradient square in gradient space.
///
/// Gradient matrices map the square `[-16384, 16384]²` (in twips) onto the shape.
pub const GRADIENT_HALF_SPAN: f64 = 16384.0 / TWIPS_PER_PX;

/// 0-based frame index in timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> XflResult<Self> {
        if start.0 > end.0 {
            return Err(XflError::project("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u32 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Iterate the frames of the range in order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Exact, hashable identity of a decoded point.
///
/// Both ends of a shared edge come out of the same decoding path, so bitwise equality of the
/// coordinates is the right notion of "same point". `-0.0` is folded into `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointKey {
    x: u64,
    y: u64,
}

impl From<Point> for PointKey {
    fn from(p: Point) -> Self {
        fn bits(v: f64) -> u64 {
            if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
        }
        Self {
            x: bits(p.x),
            y: bits(p.y),
        }
    }
}

/// Format a number the way it appears in SVG attributes: shortest round-trip form, `10`
/// rather than `10.0`, and never `-0`.
pub fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

/// Return `true` for the exact identity matrix.
pub fn is_identity_matrix(m: Affine) -> bool {
    m.as_coeffs() == [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
}

/// SVG `matrix(...)` function for an affine transform.
///
/// `kurbo` stores coefficients in the same column-major order as SVG (`a b c d e f`).
pub fn matrix_fn(m: Affine) -> String {
    let c = m.as_coeffs();
    format!(
        "matrix({}, {}, {}, {}, {}, {})",
        fmt_num(c[0]),
        fmt_num(c[1]),
        fmt_num(c[2]),
        fmt_num(c[3]),
        fmt_num(c[4]),
        fmt_num(c[5])
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
