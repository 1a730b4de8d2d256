//! Synthetic pitch templates and broadcast-like camera views.

use super::noise::PixelNoise;
use crate::{transform_point, Mat3, Pt2, Real};

/// Number of landmarks in [`pitch_template`].
pub const PITCH_POINT_COUNT: usize = 33;

const PITCH_LENGTH: Real = 105.0;
const PITCH_WIDTH: Real = 68.0;

/// Generate an `nx * ny` grid spanning the unit square, corners included.
///
/// Points are ordered row-major (Y major).
pub fn grid_points_2d(nx: usize, ny: usize) -> Vec<Pt2> {
    let step = |n: usize| if n > 1 { 1.0 / (n - 1) as Real } else { 0.0 };
    let (sx, sy) = (step(nx), step(ny));
    let mut points = Vec::with_capacity(nx.saturating_mul(ny));
    for j in 0..ny {
        for i in 0..nx {
            points.push(Pt2::new(i as Real * sx, j as Real * sy));
        }
    }
    points
}

/// Football pitch landmarks in unit-square template coordinates.
///
/// Order: left half (corners, penalty box, goal box, penalty spot, arc
/// intersections), the mirrored right half, then the halfway line and centre
/// circle. The layout is stable; tests rely on indices.
pub fn pitch_template() -> Vec<Pt2> {
    let m = |x: Real, y: Real| Pt2::new(x / PITCH_LENGTH, y / PITCH_WIDTH);
    let half_w = PITCH_WIDTH / 2.0;

    // Metres measured from the left goal line.
    let left = [
        (0.0, 0.0),
        (0.0, PITCH_WIDTH),
        (0.0, half_w - 20.16),
        (0.0, half_w + 20.16),
        (16.5, half_w - 20.16),
        (16.5, half_w + 20.16),
        (0.0, half_w - 9.16),
        (0.0, half_w + 9.16),
        (5.5, half_w - 9.16),
        (5.5, half_w + 9.16),
        (11.0, half_w),
        (16.5, half_w - 7.31),
        (16.5, half_w + 7.31),
    ];

    let mut points = Vec::with_capacity(PITCH_POINT_COUNT);
    points.extend(left.iter().map(|&(x, y)| m(x, y)));
    points.extend(left.iter().map(|&(x, y)| m(PITCH_LENGTH - x, y)));

    let mid = PITCH_LENGTH / 2.0;
    points.extend([
        m(mid, 0.0),
        m(mid, PITCH_WIDTH),
        m(mid, half_w),
        m(mid, half_w - 9.15),
        m(mid, half_w + 9.15),
        m(mid - 9.15, half_w),
        m(mid + 9.15, half_w),
    ]);
    points
}

/// A perspective template→frame homography resembling a broadcast view.
///
/// `zoom` scales the view about the frame centre; values above 1 push the
/// pitch edges out of frame.
pub fn broadcast_homography(zoom: Real) -> Mat3 {
    let base = Mat3::new(0.9, 0.25, 0.05, 0.0, 0.55, 0.3, 0.0, 0.4, 1.0);
    let offset = 0.5 * (1.0 - zoom);
    let about_centre = Mat3::new(zoom, 0.0, offset, 0.0, zoom, offset, 0.0, 0.0, 1.0);
    about_centre * base
}

/// Project template points through `h` and perturb them with `noise`.
///
/// `frame_idx` selects an independent noise stream.
pub fn observe(h: &Mat3, template: &[Pt2], noise: &PixelNoise, frame_idx: usize) -> Vec<Pt2> {
    template
        .iter()
        .enumerate()
        .map(|(i, p)| transform_point(h, p, false) + noise.sample(frame_idx, i))
        .collect()
}
