//! Core math and geometry primitives for `pitchmap`.
//!
//! This crate provides the building blocks shared by the rest of the
//! workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Mat3`) and homogeneous helpers,
//! - geometry primitives: visibility test, projective point transform and the
//!   reference-resolution reprojection error,
//! - [`HotMask`] and [`CorrespondenceSet`], the index-aligned data model for
//!   template/frame point correspondences,
//! - deterministic synthetic data for tests and benchmarks.
//!
//! All homographies in this workspace map **template** coordinates to
//! **observed** (frame) coordinates: `x_obs ~ H x_tpl`.
//!
//! # Example
//!
//! ```
//! use pitchmap_core::{is_visible, transform_point, Mat3, Pt2};
//!
//! let h = Mat3::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0);
//! let p = transform_point(&h, &Pt2::new(0.25, 0.5), false);
//! assert!((p.x - 0.5).abs() < 1e-12);
//! assert!(is_visible(&p));
//! ```

/// Point correspondences between a template and a frame.
mod correspondence;
/// Visibility, projection and reprojection error.
mod geometry;
/// Per-correspondence inclusion flags.
mod mask;
/// Linear algebra type aliases and helpers.
mod math;
/// Deterministic synthetic data generation helpers.
///
/// Used by workspace tests to build pitch-like templates, known homographies
/// and noisy observations without any random number generator state.
pub mod synthetic;

pub use correspondence::*;
pub use geometry::*;
pub use mask::*;
pub use math::*;
