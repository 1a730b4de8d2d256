//! Homography estimation (plane-induced projective transform).
//!
//! The homography `H` maps **template points** to **observed frame points**:
//! `x_obs ~ H x_tpl`. Both sides are usually in normalized `[0,1]` units;
//! normalization is applied internally for numerical stability and the
//! output is de-normalized and scaled so that `H[2,2] == 1`.

use crate::math::normalize_points_2d;
use log::debug;
use nalgebra::DMatrix;
use pitchmap_core::{HotMask, Mat3, Pt2, Real};
use thiserror::Error;

/// Minimum number of correspondences for a homography.
pub const MIN_HOMOGRAPHY_POINTS: usize = 4;

/// Ratio of the second-smallest to the largest singular value of the DLT
/// system below which the solution is not unique.
const RANK_TOL: Real = 1e-9;

/// Errors that can occur during homography estimation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HomographyError {
    /// Fewer than four hot correspondences were supplied.
    #[error("need at least {min} point correspondences, got {got}")]
    InsufficientPoints { got: usize, min: usize },
    /// Collinear, coincident or otherwise rank-deficient configuration.
    #[error("degenerate point configuration: homography is not unique")]
    DegenerateConfiguration,
    /// Template, observed and mask lengths disagree.
    #[error("length mismatch: {template} template points, {observed} observed points, mask of {mask}")]
    LengthMismatch {
        template: usize,
        observed: usize,
        mask: usize,
    },
    /// The matrix has no inverse.
    #[error("homography is singular")]
    Singular,
}

/// High-level entry point for homography estimation.
#[derive(Debug, Clone, Copy)]
pub struct HomographySolver;

/// Estimate `H` such that `observed ~ H template` using normalized DLT.
///
/// Every supplied pair is used; see [`fit_homography`] for the masked form.
pub fn dlt_homography(template: &[Pt2], observed: &[Pt2]) -> Result<Mat3, HomographyError> {
    HomographySolver::dlt(template, observed)
}

/// Estimate `H` from the pairs whose index is hot in `mask`.
///
/// # Errors
///
/// - [`HomographyError::LengthMismatch`] if the three inputs differ in length,
/// - [`HomographyError::InsufficientPoints`] with fewer than four hot pairs,
/// - [`HomographyError::DegenerateConfiguration`] if the hot pairs do not
///   determine a unique homography.
pub fn fit_homography(
    template: &[Pt2],
    observed: &[Pt2],
    mask: &HotMask,
) -> Result<Mat3, HomographyError> {
    HomographySolver::fit_masked(template, observed, mask)
}

impl HomographySolver {
    /// Estimate a homography `H` such that `observed ~ H template`.
    ///
    /// Uses Hartley-style normalization (zero mean, average distance √2) and
    /// solves `A h = 0` via SVD of the design matrix `A`. The solution is
    /// rejected when the null space of `A` is more than one-dimensional.
    pub fn dlt(template: &[Pt2], observed: &[Pt2]) -> Result<Mat3, HomographyError> {
        let n = template.len();
        if observed.len() != n {
            return Err(HomographyError::LengthMismatch {
                template: n,
                observed: observed.len(),
                mask: n,
            });
        }
        if n < MIN_HOMOGRAPHY_POINTS {
            return Err(HomographyError::InsufficientPoints {
                got: n,
                min: MIN_HOMOGRAPHY_POINTS,
            });
        }

        let (tpl_n, t_tpl) =
            normalize_points_2d(template).ok_or(HomographyError::DegenerateConfiguration)?;
        let (obs_n, t_obs) =
            normalize_points_2d(observed).ok_or(HomographyError::DegenerateConfiguration)?;

        // Pad to at least 9 rows so the SVD yields a full 9×9 V^T.
        let rows = (2 * n).max(9);
        let mut a = DMatrix::<Real>::zeros(rows, 9);

        for (i, (pt, po)) in tpl_n.iter().zip(obs_n.iter()).enumerate() {
            let (x, y) = (pt.x, pt.y);
            let (u, v) = (po.x, po.y);

            let r0 = 2 * i;
            let r1 = 2 * i + 1;

            a[(r0, 0)] = -x;
            a[(r0, 1)] = -y;
            a[(r0, 2)] = -1.0;
            a[(r0, 6)] = u * x;
            a[(r0, 7)] = u * y;
            a[(r0, 8)] = u;

            a[(r1, 3)] = -x;
            a[(r1, 4)] = -y;
            a[(r1, 5)] = -1.0;
            a[(r1, 6)] = v * x;
            a[(r1, 7)] = v * y;
            a[(r1, 8)] = v;
        }

        let svd = a.svd(false, true);
        let v_t = svd.v_t.ok_or(HomographyError::DegenerateConfiguration)?;
        let sv = &svd.singular_values;

        // Singular values are not assumed to be sorted.
        let mut order: Vec<usize> = (0..sv.len()).collect();
        order.sort_by(|&i, &j| sv[i].total_cmp(&sv[j]));
        let s_max = sv[order[order.len() - 1]];
        let s_second = sv[order[1]];
        if !(s_max.is_finite() && s_max > 0.0) || s_second <= RANK_TOL * s_max {
            debug!(
                "rank-deficient DLT system over {} points (s2/smax = {:e})",
                n,
                s_second / s_max
            );
            return Err(HomographyError::DegenerateConfiguration);
        }

        let h_vec = v_t.row(order[0]);
        let mut h = Mat3::zeros();
        for r in 0..3 {
            for c in 0..3 {
                h[(r, c)] = h_vec[3 * r + c];
            }
        }

        let t_obs_inv = t_obs
            .try_inverse()
            .ok_or(HomographyError::DegenerateConfiguration)?;
        h = t_obs_inv * h * t_tpl;

        let scale = h[(2, 2)];
        if scale.abs() <= f64::EPSILON * h.norm() {
            return Err(HomographyError::DegenerateConfiguration);
        }
        h /= scale;

        if h.iter().any(|v| !v.is_finite()) {
            return Err(HomographyError::DegenerateConfiguration);
        }
        Ok(h)
    }

    /// Estimate a homography from the pairs selected by `mask`.
    pub fn fit_masked(
        template: &[Pt2],
        observed: &[Pt2],
        mask: &HotMask,
    ) -> Result<Mat3, HomographyError> {
        if template.len() != observed.len() || mask.len() != template.len() {
            return Err(HomographyError::LengthMismatch {
                template: template.len(),
                observed: observed.len(),
                mask: mask.len(),
            });
        }
        let hot = mask.count_hot();
        if hot < MIN_HOMOGRAPHY_POINTS {
            return Err(HomographyError::InsufficientPoints {
                got: hot,
                min: MIN_HOMOGRAPHY_POINTS,
            });
        }
        Self::dlt(&mask.select(template), &mask.select(observed))
    }
}

/// Invert a homography, keeping the `H[2,2] == 1` convention when possible.
///
/// Used at boundaries where a collaborator stores the opposite direction
/// (observed → template).
pub fn invert_homography(h: &Mat3) -> Result<Mat3, HomographyError> {
    let mut inv = h.try_inverse().ok_or(HomographyError::Singular)?;
    let scale = inv[(2, 2)];
    if scale.abs() > f64::EPSILON * inv.norm() {
        inv /= scale;
    }
    if inv.iter().any(|v| !v.is_finite()) {
        return Err(HomographyError::Singular);
    }
    Ok(inv)
}

/// Express a normalized template→frame homography in pixel units.
///
/// Computes `S_image · H · S_template⁻¹` where `S` scales unit coordinates
/// to `(width, height)` pixels. The result warps a template raster of
/// `template_size` onto an image of `image_size`.
pub fn homography_to_pixels(h: &Mat3, template_size: (Real, Real), image_size: (Real, Real)) -> Mat3 {
    let s_image = Mat3::new(image_size.0, 0.0, 0.0, 0.0, image_size.1, 0.0, 0.0, 0.0, 1.0);
    let s_template_inv = Mat3::new(
        1.0 / template_size.0,
        0.0,
        0.0,
        0.0,
        1.0 / template_size.1,
        0.0,
        0.0,
        0.0,
        1.0,
    );
    s_image * h * s_template_inv
}
