//! Optimal point-of-interest selection for template-to-frame homographies.
//!
//! Given an over-determined set of correspondences, some of them noisy, the
//! crate selects a small stable subset of landmarks and fits the final
//! homography on it:
//!
//! 1. [`reduce_hot_poi`] greedily drops the correspondence whose removal
//!    yields the smallest reprojection error until `target_count` remain.
//! 2. [`find_optimal_poi`] seeds the reduction from a predicted homography,
//!    then re-fits against the original observations.
//!
//! Both are pure functions: masks are copied per trial and only the final
//! mask is returned.
//!
//! # Example
//!
//! ```
//! use pitchmap_core::synthetic::{noise::PixelNoise, pitch};
//! use pitchmap_poi::{find_optimal_poi, PoiConfig};
//!
//! let template = pitch::pitch_template();
//! let h = pitch::broadcast_homography(1.0);
//! let observed = pitch::observe(&h, &template, &PixelNoise::new(7, 1.0), 0);
//!
//! // The predicted transform works in symmetric [-1,1] space on both sides.
//! let to_sym = nalgebra::Matrix3::new(2.0, 0.0, -1.0, 0.0, 2.0, -1.0, 0.0, 0.0, 1.0);
//! let predicted = to_sym * h * to_sym.try_inverse().unwrap();
//!
//! let result = find_optimal_poi(&predicted, &observed, &template, &PoiConfig::default()).unwrap();
//! assert_eq!(result.hot.count_hot(), 5);
//! ```

mod config;
mod optimal;
mod reduce;

pub use config::*;
pub use optimal::*;
pub use reduce::*;

use pitchmap_linear::HomographyError;
use thiserror::Error;

/// Errors returned by PoI reduction and optimal selection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoiError {
    /// A homography needs at least four points, so smaller targets are invalid.
    #[error("target point count must be at least {min}, got {got}")]
    InvalidTargetCount { got: usize, min: usize },
    /// Inputs are not index-aligned.
    #[error("length mismatch: {template} template points, {observed} observed points, mask of {mask}")]
    LengthMismatch {
        template: usize,
        observed: usize,
        mask: usize,
    },
    /// Every candidate removal in a reduction round produced a degenerate fit.
    #[error("degenerate configuration: no viable removal among {active} hot points")]
    DegenerateRound { active: usize },
    /// The final homography fit failed.
    #[error("homography fit failed: {0}")]
    Homography(#[from] HomographyError),
}

impl PoiError {
    /// True for failures caused by a rank-deficient point configuration.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            PoiError::DegenerateRound { .. }
                | PoiError::Homography(HomographyError::DegenerateConfiguration)
        )
    }
}
