//! Hot mask: which correspondences take part in the current homography fit.

use crate::{is_visible, Pt2};
use serde::{Deserialize, Serialize};

/// One inclusion flag per correspondence index.
///
/// `true` means the correspondence is *hot* (used for fitting and scoring).
/// The mask is index-aligned with a [`crate::CorrespondenceSet`]; it never
/// changes length after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotMask(Vec<bool>);

impl HotMask {
    /// Mask with every index hot.
    pub fn all_hot(len: usize) -> Self {
        Self(vec![true; len])
    }

    /// Mask with every index cold.
    pub fn all_cold(len: usize) -> Self {
        Self(vec![false; len])
    }

    /// Mask with index `i` hot iff `points[i]` lies inside the unit square.
    pub fn from_visibility(points: &[Pt2]) -> Self {
        Self(points.iter().map(is_visible).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether index `idx` is hot. Out-of-range indices are cold.
    #[inline]
    pub fn is_hot(&self, idx: usize) -> bool {
        self.0.get(idx).copied().unwrap_or(false)
    }

    /// Set the state of `idx`. Returns the previous state, or `None` if
    /// `idx` is out of range (in which case nothing changes).
    pub fn set(&mut self, idx: usize, hot: bool) -> Option<bool> {
        let slot = self.0.get_mut(idx)?;
        Some(std::mem::replace(slot, hot))
    }

    /// Flip the state of `idx`, returning the new state.
    pub fn toggle(&mut self, idx: usize) -> Option<bool> {
        let slot = self.0.get_mut(idx)?;
        *slot = !*slot;
        Some(*slot)
    }

    /// Mark every index cold.
    pub fn clear(&mut self) {
        self.0.fill(false);
    }

    /// Number of hot indices.
    pub fn count_hot(&self) -> usize {
        self.0.iter().filter(|&&h| h).count()
    }

    /// Hot indices in ascending order.
    pub fn hot_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &h)| h.then_some(i))
    }

    /// A copy of this mask with `idx` cleared. The original is untouched.
    pub fn with_cold(&self, idx: usize) -> Self {
        let mut trial = self.clone();
        trial.set(idx, false);
        trial
    }

    /// Select the elements of `values` at hot indices, preserving order.
    pub fn select<T: Clone>(&self, values: &[T]) -> Vec<T> {
        values
            .iter()
            .zip(self.0.iter())
            .filter_map(|(v, &h)| h.then(|| v.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for HotMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

impl FromIterator<bool> for HotMask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
