use nalgebra::{Matrix3, Point2, Vector2, Vector3};

/// Scalar type used throughout the workspace (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// The input is interpreted as `(x, y, w)` and the result is `(x / w, y / w)`.
/// A zero `w` yields non-finite coordinates; callers that care must check
/// [`is_finite_point`].
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Returns true if both coordinates are finite.
#[inline]
pub fn is_finite_point(p: &Pt2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Map a point from the unit square `[0,1]²` to the symmetric square `[-1,1]²`.
#[inline]
pub fn unit_to_symmetric(p: &Pt2) -> Pt2 {
    Pt2::new((p.x - 0.5) * 2.0, (p.y - 0.5) * 2.0)
}

/// Map a point from the symmetric square `[-1,1]²` back to the unit square.
#[inline]
pub fn symmetric_to_unit(p: &Pt2) -> Pt2 {
    Pt2::new(p.x / 2.0 + 0.5, p.y / 2.0 + 0.5)
}
