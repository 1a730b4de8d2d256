//! Annotation jitter in reference pixels.
//!
//! Landmark predictions are off by a few pixels at the resolution errors are
//! reported in, not by a fixed fraction of the frame. [`PixelNoise`] draws a
//! bounded per-axis offset in pixels of a [`ReferenceResolution`] and returns
//! it in normalized frame units. Samples are a pure function of
//! `(seed, frame, point)`, so datasets are identical on every platform.

use crate::{ReferenceResolution, Real, Vec2};

/// Uniform jitter of at most `max_px` reference pixels per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelNoise {
    pub seed: u64,
    /// Maximum absolute offset per axis, in reference pixels.
    pub max_px: Real,
    pub reference: ReferenceResolution,
}

impl Default for PixelNoise {
    /// No jitter.
    fn default() -> Self {
        Self::new(0, 0.0)
    }
}

impl PixelNoise {
    /// Jitter measured at the default 1280×720 reference.
    pub fn new(seed: u64, max_px: Real) -> Self {
        Self {
            seed,
            max_px,
            reference: ReferenceResolution::default(),
        }
    }

    pub fn with_reference(mut self, reference: ReferenceResolution) -> Self {
        self.reference = reference;
        self
    }

    /// Offset of landmark `point_idx` in frame `frame_idx`, in reference pixels.
    pub fn sample_px(&self, frame_idx: usize, point_idx: usize) -> Vec2 {
        let max_px = self.max_px.abs();
        if max_px == 0.0 {
            return Vec2::zeros();
        }
        let axis = |a: u64| {
            let h = fold(self.seed, [frame_idx as u64, point_idx as u64, a]);
            (2.0 * unit(h) - 1.0) * max_px
        };
        Vec2::new(axis(0), axis(1))
    }

    /// [`Self::sample_px`] converted to normalized frame units.
    pub fn sample(&self, frame_idx: usize, point_idx: usize) -> Vec2 {
        let px = self.sample_px(frame_idx, point_idx);
        Vec2::new(px.x / self.reference.width, px.y / self.reference.height)
    }
}

/// FNV-1a over the key words followed by the murmur3 64-bit finalizer.
fn fold(seed: u64, words: [u64; 3]) -> u64 {
    let mut h = 0xCBF2_9CE4_8422_2325 ^ seed;
    for w in words {
        h = (h ^ w).wrapping_mul(0x0000_0100_0000_01B3);
    }
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    h = h.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    h ^ (h >> 33)
}

/// Top 53 bits of `h` as a value in `[0, 1)`.
fn unit(h: u64) -> Real {
    (h >> 11) as Real * (Real::EPSILON / 2.0)
}
