//! Per-frame network predictions.
//!
//! A prediction file maps frame identifiers to the predicted landmark
//! positions (unit-square frame coordinates), a homography and a score:
//!
//! ```json
//! { "clip_000123": { "poi": [[0.1, 0.2], ...], "theta": [[[...], [...], [...]]], "score": 0.93 } }
//! ```
//!
//! The stored homography maps symmetric `[-1,1]` *frame* coordinates to
//! symmetric *template* coordinates, the opposite of the workspace
//! convention. [`FramePrediction::template_to_observed`] performs the
//! inversion; nothing else in the workspace should.

use pitchmap_core::{Mat3, Pt2, Real};
use pitchmap_linear::invert_homography;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{mat3_from_rows, points_from_pairs, COLD_POINT};

/// Predictions keyed by frame identifier, iterated in sorted order.
pub type Predictions = BTreeMap<String, FramePrediction>;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("cannot read predictions {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse predictions: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("prediction has no homography")]
    MissingHomography,
    #[error("predicted homography is singular")]
    SingularHomography,
    #[error("prediction has {got} points, template has {expected}")]
    PointCount { got: usize, expected: usize },
}

/// Homography as stored by the predictor: either a bare 3×3 matrix or a
/// batch of them, of which the first is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredHomography {
    Single([[Real; 3]; 3]),
    Batched(Vec<[[Real; 3]; 3]>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePrediction {
    /// Predicted landmark positions, index-aligned with the template.
    #[serde(alias = "pointOfInterest")]
    pub poi: Vec<[Real; 2]>,
    #[serde(alias = "homography")]
    pub theta: StoredHomography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Real>,
}

impl FramePrediction {
    /// Predicted landmark positions as points.
    pub fn points(&self) -> Vec<Pt2> {
        points_from_pairs(&self.poi)
    }

    /// The homography exactly as stored (frame→template, symmetric space).
    pub fn stored_homography(&self) -> Result<Mat3, PredictionError> {
        let rows = match &self.theta {
            StoredHomography::Single(rows) => rows,
            StoredHomography::Batched(batch) => {
                batch.first().ok_or(PredictionError::MissingHomography)?
            }
        };
        Ok(mat3_from_rows(rows))
    }

    /// Template→frame homography in symmetric `[-1,1]` space on both sides.
    pub fn template_to_observed(&self) -> Result<Mat3, PredictionError> {
        invert_homography(&self.stored_homography()?)
            .map_err(|_| PredictionError::SingularHomography)
    }

    /// Check that the prediction is index-aligned with a template of `expected` points.
    pub fn check_len(&self, expected: usize) -> Result<(), PredictionError> {
        if self.poi.len() != expected {
            return Err(PredictionError::PointCount {
                got: self.poi.len(),
                expected,
            });
        }
        Ok(())
    }
}

/// Points used for frames without a prediction; never visible.
pub fn placeholder_points(len: usize) -> Vec<Pt2> {
    vec![Pt2::new(COLD_POINT[0], COLD_POINT[1]); len]
}

pub fn parse_predictions(data: &str) -> Result<Predictions, PredictionError> {
    Ok(serde_json::from_str(data)?)
}

pub fn load_predictions(path: &Path) -> Result<Predictions, PredictionError> {
    let data = std::fs::read_to_string(path).map_err(|source| PredictionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_predictions(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchmap_core::{is_visible, transform_point};

    const PREDS: &str = r#"{
        "b_frame": {
            "poi": [[0.1, 0.2], [0.5, 0.5]],
            "theta": [[[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]]],
            "score": 0.9
        },
        "a_frame": {
            "pointOfInterest": [[0.3, 0.4], [-1.0, -1.0]],
            "homography": [[1.0, 0.0, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
        }
    }"#;

    #[test]
    fn parses_both_layouts_in_sorted_order() {
        let preds = parse_predictions(PREDS).unwrap();
        let keys: Vec<&str> = preds.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a_frame", "b_frame"]);

        let a = &preds["a_frame"];
        assert_eq!(a.score, None);
        assert_eq!(a.points()[0], Pt2::new(0.3, 0.4));
        assert_eq!(a.stored_homography().unwrap()[(0, 2)], 0.5);

        let b = &preds["b_frame"];
        assert_eq!(b.score, Some(0.9));
        assert_eq!(b.stored_homography().unwrap()[(1, 1)], 2.0);
    }

    #[test]
    fn stored_homography_is_inverted_at_the_boundary() {
        let preds = parse_predictions(PREDS).unwrap();
        let b = &preds["b_frame"];
        let h = b.template_to_observed().unwrap();
        let p = transform_point(&h, &Pt2::new(0.8, -0.4), false);
        assert!((p - Pt2::new(0.4, -0.2)).norm() < 1e-12);
    }

    #[test]
    fn singular_or_missing_homography_is_an_error() {
        let p = FramePrediction {
            poi: vec![],
            theta: StoredHomography::Single([[0.0; 3]; 3]),
            score: None,
        };
        assert!(matches!(
            p.template_to_observed(),
            Err(PredictionError::SingularHomography)
        ));
        let p = FramePrediction {
            theta: StoredHomography::Batched(vec![]),
            ..p
        };
        assert!(matches!(
            p.stored_homography(),
            Err(PredictionError::MissingHomography)
        ));
    }

    #[test]
    fn placeholders_are_never_visible() {
        assert!(placeholder_points(3).iter().all(|p| !is_visible(p)));
    }

    #[test]
    fn length_check_reports_counts() {
        let preds = parse_predictions(PREDS).unwrap();
        let err = preds["a_frame"].check_len(33).unwrap_err();
        assert!(matches!(err, PredictionError::PointCount { got: 2, expected: 33 }));
    }
}
