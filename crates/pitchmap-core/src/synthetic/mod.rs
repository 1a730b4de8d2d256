//! Deterministic synthetic data generation helpers.
//!
//! Building blocks for synthetic annotation problems used in tests:
//! - a football-pitch landmark template and simple unit-square grids,
//! - perspective homographies resembling broadcast camera views,
//! - deterministic pseudo-random observation noise.
//!
//! The helpers are deterministic (explicit seeds, stable point ordering).
//!
//! # Example
//!
//! ```
//! use pitchmap_core::synthetic::{noise::PixelNoise, pitch};
//!
//! let template = pitch::pitch_template();
//! let h = pitch::broadcast_homography(1.0);
//! let observed = pitch::observe(&h, &template, &PixelNoise::default(), 0);
//! assert_eq!(observed.len(), pitch::PITCH_POINT_COUNT);
//! ```

pub mod noise;
pub mod pitch;
