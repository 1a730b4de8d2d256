//! Geometry primitives used by homography fitting and PoI selection.
//!
//! Points live in normalized frame space `[0,1] × [0,1]`. Errors are measured
//! after scaling both point sets to a fixed [`ReferenceResolution`] so that
//! scores are comparable across images of different native size.

use crate::{from_homogeneous, symmetric_to_unit, to_homogeneous, HotMask, Mat3, Pt2, Real};
use serde::{Deserialize, Serialize};

/// Pixel resolution used to express reprojection errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceResolution {
    /// Width in pixels.
    pub width: Real,
    /// Height in pixels.
    pub height: Real,
}

impl ReferenceResolution {
    pub const fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }

    /// Scale a normalized point to reference pixels.
    #[inline]
    pub fn to_pixels(&self, p: &Pt2) -> Pt2 {
        Pt2::new(p.x * self.width, p.y * self.height)
    }
}

impl Default for ReferenceResolution {
    /// 1280×720, the resolution annotation errors are reported in.
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Returns true iff both coordinates lie in `[0, 1]`.
///
/// Non-finite coordinates are never visible.
#[inline]
pub fn is_visible(p: &Pt2) -> bool {
    (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
}

/// Apply the projective transform `h` to a single point.
///
/// With `normalize_to_unit_square` the result is remapped from `[-1,1]` to
/// `[0,1]` via `v / 2 + 0.5`.
pub fn transform_point(h: &Mat3, p: &Pt2, normalize_to_unit_square: bool) -> Pt2 {
    let q = from_homogeneous(&(h * to_homogeneous(p)));
    if normalize_to_unit_square {
        symmetric_to_unit(&q)
    } else {
        q
    }
}

/// Apply [`transform_point`] to every point, preserving order.
pub fn transform_points(h: &Mat3, points: &[Pt2], normalize_to_unit_square: bool) -> Vec<Pt2> {
    points
        .iter()
        .map(|p| transform_point(h, p, normalize_to_unit_square))
        .collect()
}

/// Mean Euclidean distance between `a[i]` and `b[i]` over hot indices.
///
/// Both point sets are scaled component-wise by `reference` before measuring.
/// Indices beyond the shortest of `a`, `b` and `mask` are ignored.
///
/// Returns `None` when no index is hot. The result is non-finite if a hot
/// point is non-finite (e.g. projected through a homography at infinity).
pub fn reprojection_error(
    a: &[Pt2],
    b: &[Pt2],
    mask: &HotMask,
    reference: ReferenceResolution,
) -> Option<Real> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for ((pa, pb), hot) in a.iter().zip(b.iter()).zip(mask.iter()) {
        if !hot {
            continue;
        }
        sum += (reference.to_pixels(pa) - reference.to_pixels(pb)).norm();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as Real)
}
