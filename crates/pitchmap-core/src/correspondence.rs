//! Index-aligned template/observed point pairs.

use crate::{HotMask, Pt2};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Ordered point correspondences between a template and a frame.
///
/// `template[i]` and `observed[i]` describe the same landmark; both are in
/// normalized `[0,1]` units. The set length is fixed per template.
///
/// # Example
///
/// ```
/// use pitchmap_core::{CorrespondenceSet, HotMask, Pt2};
///
/// let set = CorrespondenceSet::new(
///     vec![Pt2::new(0.0, 0.0), Pt2::new(1.0, 0.0)],
///     vec![Pt2::new(0.1, 0.1), Pt2::new(0.9, 0.1)],
/// )
/// .unwrap();
/// let (tpl, obs) = set.hot_pairs(&HotMask::from(vec![false, true]));
/// assert_eq!(tpl, vec![Pt2::new(1.0, 0.0)]);
/// assert_eq!(obs, vec![Pt2::new(0.9, 0.1)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceSet {
    /// Landmark positions on the template.
    pub template: Vec<Pt2>,
    /// Landmark positions observed in the frame.
    pub observed: Vec<Pt2>,
}

impl CorrespondenceSet {
    /// # Errors
    ///
    /// Returns an error if the template and observed point counts differ.
    pub fn new(template: Vec<Pt2>, observed: Vec<Pt2>) -> Result<Self> {
        ensure!(
            template.len() == observed.len(),
            "template / observed point counts must match: {} vs {}",
            template.len(),
            observed.len()
        );
        Ok(Self { template, observed })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.template.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    /// Visibility mask of the observed points.
    pub fn visibility_mask(&self) -> HotMask {
        HotMask::from_visibility(&self.observed)
    }

    /// Template and observed points at hot indices, in index order.
    pub fn hot_pairs(&self, mask: &HotMask) -> (Vec<Pt2>, Vec<Pt2>) {
        (mask.select(&self.template), mask.select(&self.observed))
    }
}
