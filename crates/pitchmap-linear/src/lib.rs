//! Linear homography estimation for template-to-frame point correspondences.
//!
//! The estimator is the normalized Direct Linear Transform: Hartley
//! conditioning of both point sets, a homogeneous least-squares solve via
//! SVD, and de-normalization. There is no outlier rejection; the caller's
//! [`HotMask`](pitchmap_core::HotMask) decides which correspondences count.

mod homography;
pub mod math;

pub use homography::*;
