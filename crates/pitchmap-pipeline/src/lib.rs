//! Data plumbing around optimal PoI selection.
//!
//! - [`template`]: load and validate landmark templates (unit-square JSON).
//! - [`predictions`]: load per-frame network predictions and convert their
//!   homography to the workspace's template→frame direction.
//! - [`frame`] and [`session`]: in-memory annotation state for manual edits
//!   of hot masks and point coordinates, with bounded undo.
//! - [`prepare`]: run optimal PoI selection over a whole prediction file.
//!
//! JSON (via `serde_json`) is the only interchange format.

pub mod frame;
pub mod predictions;
pub mod prepare;
pub mod session;
pub mod template;

pub use frame::{AnnotationError, FrameAnnotation, FrameDelta, FrameExport};
pub use predictions::{load_predictions, FramePrediction, PredictionError, Predictions};
pub use prepare::{
    prepare_predictions, write_prepared, write_prepared_to, PrepareError, PrepareOptions,
    PrepareReport, PreparedFrame, SkipReason, SkippedFrame,
};
pub use session::{AnnotationSession, EDIT_HISTORY_CAPACITY};
pub use template::{PitchTemplate, TemplateError, FOOTBALL_PITCH_POINTS};

use pitchmap_core::{Mat3, Pt2, Real};

/// Coordinates written for landmarks that are not hot.
pub const COLD_POINT: [Real; 2] = [-1.0, -1.0];

/// Row-major `[[f64; 3]; 3]` from a matrix.
pub fn mat3_to_rows(m: &Mat3) -> [[Real; 3]; 3] {
    let mut rows = [[0.0; 3]; 3];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = m[(r, c)];
        }
    }
    rows
}

/// Matrix from row-major `[[f64; 3]; 3]`.
pub fn mat3_from_rows(a: &[[Real; 3]; 3]) -> Mat3 {
    Mat3::from_row_slice(&[
        a[0][0], a[0][1], a[0][2], a[1][0], a[1][1], a[1][2], a[2][0], a[2][1], a[2][2],
    ])
}

pub(crate) fn points_from_pairs(pairs: &[[Real; 2]]) -> Vec<Pt2> {
    pairs.iter().map(|p| Pt2::new(p[0], p[1])).collect()
}
