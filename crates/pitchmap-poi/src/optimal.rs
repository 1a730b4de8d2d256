//! Optimal PoI selection: from a predicted homography to a reduced, re-fitted one.

use log::debug;
use pitchmap_core::{
    reprojection_error, transform_points, unit_to_symmetric, CorrespondenceSet, HotMask, Mat3,
    Pt2, Real,
};
use pitchmap_linear::{fit_homography, HomographyError, MIN_HOMOGRAPHY_POINTS};

use crate::{reduce_hot_poi, PoiConfig, PoiError, ReductionStep};

/// Result of [`find_optimal_poi`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalPoi {
    /// Reduced hot mask, index-aligned with the template.
    pub hot: HotMask,
    /// Template→frame homography fitted on the reduced mask against the
    /// original observations (unit-square units on both sides).
    pub homography: Mat3,
    /// Mean reprojection error over the reduced hot set, in reference pixels.
    pub error: Real,
    /// Removals committed by the reduction.
    pub steps: Vec<ReductionStep>,
}

/// Select a minimal stable landmark subset and fit the final homography.
///
/// - `predicted` maps symmetric template coordinates `[-1,1]²` to symmetric
///   frame coordinates; it is used only to decide which landmarks are
///   visible and well-behaved, never for the final fit.
/// - `observed` are the landmark positions predicted in the frame and
///   `template` the landmark positions on the template, both in `[0,1]`.
///
/// Steps: project the symmetric template through `predicted` into the unit
/// square, seed the hot mask from visibility of that projection, greedily
/// reduce it to `config.target_count` using the projection as observations,
/// then re-fit on the reduced mask against `observed` and score the result.
///
/// # Errors
///
/// Reduction errors are propagated. A failure of the final fit is always
/// surfaced as [`PoiError::Homography`].
pub fn find_optimal_poi(
    predicted: &Mat3,
    observed: &[Pt2],
    template: &[Pt2],
    config: &PoiConfig,
) -> Result<OptimalPoi, PoiError> {
    config.validate()?;
    if observed.len() != template.len() {
        return Err(PoiError::LengthMismatch {
            template: template.len(),
            observed: observed.len(),
            mask: template.len(),
        });
    }

    let template_sym: Vec<Pt2> = template.iter().map(unit_to_symmetric).collect();
    let expected = transform_points(predicted, &template_sym, true);
    let initial = HotMask::from_visibility(&expected);
    debug!(
        "{} of {} landmarks visible under the predicted homography",
        initial.count_hot(),
        template.len()
    );

    let seeded = CorrespondenceSet {
        template: template.to_vec(),
        observed: expected,
    };
    let reduction = reduce_hot_poi(&seeded, &initial, config.target_count, config.reference)?;

    let homography = fit_homography(template, observed, &reduction.mask)?;
    let projected = transform_points(&homography, template, false);
    let error = reprojection_error(observed, &projected, &reduction.mask, config.reference)
        .ok_or(HomographyError::InsufficientPoints {
            got: 0,
            min: MIN_HOMOGRAPHY_POINTS,
        })?;
    debug!(
        "optimal PoI: {} hot points, reprojection error {error:.4}",
        reduction.mask.count_hot()
    );

    Ok(OptimalPoi {
        hot: reduction.mask,
        homography,
        error,
        steps: reduction.steps,
    })
}
