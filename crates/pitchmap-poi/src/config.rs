use pitchmap_core::ReferenceResolution;
use pitchmap_linear::MIN_HOMOGRAPHY_POINTS;
use serde::{Deserialize, Serialize};

use crate::PoiError;

/// Default number of landmarks kept after reduction.
pub const DEFAULT_TARGET_COUNT: usize = 5;

/// Configuration for optimal PoI selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    /// Number of hot correspondences to keep (at least 4).
    pub target_count: usize,
    /// Resolution the reprojection error is measured in.
    pub reference: ReferenceResolution,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            reference: ReferenceResolution::default(),
        }
    }
}

impl PoiConfig {
    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    /// # Errors
    ///
    /// [`PoiError::InvalidTargetCount`] if `target_count < 4`.
    pub fn validate(&self) -> Result<(), PoiError> {
        validate_target_count(self.target_count)
    }
}

pub(crate) fn validate_target_count(target_count: usize) -> Result<(), PoiError> {
    if target_count < MIN_HOMOGRAPHY_POINTS {
        return Err(PoiError::InvalidTargetCount {
            got: target_count,
            min: MIN_HOMOGRAPHY_POINTS,
        });
    }
    Ok(())
}
