//! Numerical conditioning helpers for DLT-style solvers.

use pitchmap_core::{Mat3, Pt2};

/// Hartley normalization for 2D points.
///
/// Centers points at the origin and scales so that the mean distance from
/// the origin is `√2`.
///
/// # Returns
///
/// * `Some((normalized_points, transform))` with `p_norm = T * p_homogeneous`
/// * `None` if the input is empty, contains non-finite values, or all points
///   coincide
///
/// # References
///
/// Hartley & Zisserman, "Multiple View Geometry in Computer Vision", 2nd ed.,
/// Algorithm 4.2 (Normalized DLT)
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (mut cx, mut cy) = (0.0, 0.0);
    for p in points {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    if !mean_dist.is_finite() || mean_dist <= f64::EPSILON {
        return None;
    }

    let scale = std::f64::consts::SQRT_2 / mean_dist;
    let t = Mat3::new(
        scale,
        0.0,
        -scale * cx,
        0.0,
        scale,
        -scale * cy,
        0.0,
        0.0,
        1.0,
    );

    let norm = points
        .iter()
        .map(|p| Pt2::new((p.x - cx) * scale, (p.y - cy) * scale))
        .collect();

    Some((norm, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_points_are_centered_with_sqrt2_spread() {
        let pts = vec![
            Pt2::new(100.0, 200.0),
            Pt2::new(150.0, 250.0),
            Pt2::new(120.0, 220.0),
            Pt2::new(90.0, 260.0),
        ];
        let (norm, t) = normalize_points_2d(&pts).unwrap();

        let cx: f64 = norm.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy: f64 = norm.iter().map(|p| p.y).sum::<f64>() / 4.0;
        assert!(cx.abs() < 1e-12 && cy.abs() < 1e-12);

        let spread: f64 = norm.iter().map(|p| p.coords.norm()).sum::<f64>() / 4.0;
        assert!((spread - std::f64::consts::SQRT_2).abs() < 1e-12);

        let mapped = t * pitchmap_core::to_homogeneous(&pts[1]);
        assert!((mapped.x - norm[1].x).abs() < 1e-12);
        assert!((mapped.y - norm[1].y).abs() < 1e-12);
    }

    #[test]
    fn coincident_points_cannot_be_normalized() {
        let pts = vec![Pt2::new(1.0, 1.0); 5];
        assert!(normalize_points_2d(&pts).is_none());
        assert!(normalize_points_2d(&[]).is_none());
    }
}
