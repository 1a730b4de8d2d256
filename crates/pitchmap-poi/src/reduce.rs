//! Greedy point-of-interest reduction.
//!
//! Each round tries every hot correspondence as a removal candidate: the
//! candidate is cleared on a *copy* of the committed mask, a homography is
//! fitted on what remains, and the reprojection error over the remaining hot
//! points is recorded. The candidate with the smallest error is removed
//! (ties go to the lowest index). Rounds repeat until `target_count` points
//! remain. This is O(N²) homography fits for N initial hot points.
//!
//! Trial fits that fail (degenerate subsets) or produce a non-finite error
//! are excluded from the round. If every candidate of a round is excluded
//! the reduction fails with [`PoiError::DegenerateRound`].

use log::debug;
use pitchmap_core::{
    reprojection_error, transform_points, CorrespondenceSet, HotMask, ReferenceResolution, Real,
};
use pitchmap_linear::{fit_homography, HomographyError, MIN_HOMOGRAPHY_POINTS};

use crate::config::validate_target_count;
use crate::PoiError;

/// One committed removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionStep {
    /// Index that was removed from the hot set.
    pub removed: usize,
    /// Reprojection error of the fit without `removed`, over the remaining hot points.
    pub error: Real,
    /// Hot points left after the removal.
    pub remaining: usize,
}

/// Outcome of [`reduce_hot_poi`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Final hot mask with `min(target_count, initial hot count)` hot points.
    pub mask: HotMask,
    /// Removals in the order they were committed.
    pub steps: Vec<ReductionStep>,
}

/// Reprojection error of the fit obtained after clearing `idx` in `mask`.
///
/// The homography is fitted on `mask` without `idx`; all template points
/// are projected through it and compared with the observed points over the
/// same reduced hot set, at `reference` resolution. `mask` itself is not
/// modified.
pub fn removal_error(
    set: &CorrespondenceSet,
    mask: &HotMask,
    idx: usize,
    reference: ReferenceResolution,
) -> Result<Real, HomographyError> {
    let trial = mask.with_cold(idx);
    trial_error(set, &trial, reference)
}

fn trial_error(
    set: &CorrespondenceSet,
    trial: &HotMask,
    reference: ReferenceResolution,
) -> Result<Real, HomographyError> {
    let h = fit_homography(&set.template, &set.observed, trial)?;
    let projected = transform_points(&h, &set.template, false);
    reprojection_error(&set.observed, &projected, trial, reference).ok_or(
        HomographyError::InsufficientPoints {
            got: 0,
            min: MIN_HOMOGRAPHY_POINTS,
        },
    )
}

/// Shrink `initial` to `target_count` hot points by greedy removal.
///
/// If `initial` already has at most `target_count` hot points it is returned
/// unchanged with no steps.
///
/// # Errors
///
/// - [`PoiError::InvalidTargetCount`] if `target_count < 4`,
/// - [`PoiError::LengthMismatch`] if `initial` and `set` differ in length,
/// - [`PoiError::DegenerateRound`] if no candidate of some round can be fitted.
pub fn reduce_hot_poi(
    set: &CorrespondenceSet,
    initial: &HotMask,
    target_count: usize,
    reference: ReferenceResolution,
) -> Result<Reduction, PoiError> {
    validate_target_count(target_count)?;
    if initial.len() != set.len() || set.observed.len() != set.template.len() {
        return Err(PoiError::LengthMismatch {
            template: set.template.len(),
            observed: set.observed.len(),
            mask: initial.len(),
        });
    }

    let mut mask = initial.clone();
    let mut steps = Vec::new();

    loop {
        let active = mask.count_hot();
        if active <= target_count {
            break;
        }

        let mut best: Option<(usize, Real)> = None;
        for idx in mask.hot_indices() {
            match removal_error(set, &mask, idx, reference) {
                Ok(error) if error.is_finite() => {
                    if best.map_or(true, |(_, best_error)| error < best_error) {
                        best = Some((idx, error));
                    }
                }
                Ok(error) => debug!("candidate {idx} skipped: non-finite error {error}"),
                Err(err) => debug!("candidate {idx} skipped: {err}"),
            }
        }

        let (removed, error) = best.ok_or(PoiError::DegenerateRound { active })?;
        mask.set(removed, false);
        let remaining = active - 1;
        debug!("excluded #{removed}, error = {error:.4}, {remaining} hot points left");
        steps.push(ReductionStep {
            removed,
            error,
            remaining,
        });
    }

    Ok(Reduction { mask, steps })
}
