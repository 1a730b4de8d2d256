//! Landmark templates.
//!
//! A template file lists the landmarks of a pitch or court in unit-square
//! coordinates:
//!
//! ```json
//! {
//!   "template_image": "pitch_template.png",
//!   "template_size": [1920, 1080],
//!   "ranges": [1.0, 1.0],
//!   "points": [{"coords": [0.0, 0.0], "label": "0"}, ...]
//! }
//! ```
//!
//! `ranges` declares the coordinate scale and must be `[1.0, 1.0]`.

use pitchmap_core::{unit_to_symmetric, Pt2, Real};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Landmark count of the football pitch template.
pub const FOOTBALL_PITCH_POINTS: usize = 33;

/// Errors raised while loading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse template: {0}")]
    Parse(#[from] serde_json::Error),
    /// Declared coordinate range is not the unit square.
    #[error("template coordinates must be unit-normalized, declared ranges are {0:?}")]
    RangeNotUnit([Real; 2]),
    #[error("template has {got} points, expected {expected}")]
    PointCount { got: usize, expected: usize },
    #[error("template has no points")]
    Empty,
}

/// On-disk template layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_image: Option<String>,
    /// Raster size `(width, height)` of the template image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_size: Option<[u32; 2]>,
    pub ranges: [Real; 2],
    pub points: Vec<TemplatePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePoint {
    pub coords: [Real; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Validated landmark template.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTemplate {
    points: Vec<Pt2>,
    labels: Vec<Option<String>>,
    image: Option<String>,
    size: Option<[u32; 2]>,
}

impl PitchTemplate {
    /// Build a template from unit-square points.
    pub fn from_points(points: Vec<Pt2>) -> Result<Self, TemplateError> {
        if points.is_empty() {
            return Err(TemplateError::Empty);
        }
        let labels = vec![None; points.len()];
        Ok(Self {
            points,
            labels,
            image: None,
            size: None,
        })
    }

    /// Load and validate a template file.
    ///
    /// `expected_points` additionally checks the landmark count.
    pub fn load(path: &Path, expected_points: Option<usize>) -> Result<Self, TemplateError> {
        let data = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data, expected_points)
    }

    pub fn from_json_str(data: &str, expected_points: Option<usize>) -> Result<Self, TemplateError> {
        let file: TemplateFile = serde_json::from_str(data)?;
        Self::from_file(file, expected_points)
    }

    pub fn from_file(file: TemplateFile, expected_points: Option<usize>) -> Result<Self, TemplateError> {
        if file.ranges != [1.0, 1.0] {
            return Err(TemplateError::RangeNotUnit(file.ranges));
        }
        if file.points.is_empty() {
            return Err(TemplateError::Empty);
        }
        if let Some(expected) = expected_points {
            if file.points.len() != expected {
                return Err(TemplateError::PointCount {
                    got: file.points.len(),
                    expected,
                });
            }
        }

        let (points, labels): (Vec<Pt2>, Vec<Option<String>>) = file
            .points
            .into_iter()
            .map(|p| (Pt2::new(p.coords[0], p.coords[1]), p.label))
            .unzip();
        Ok(Self {
            points,
            labels,
            image: file.template_image,
            size: file.template_size,
        })
    }

    /// Landmarks in unit-square coordinates.
    pub fn points(&self) -> &[Pt2] {
        &self.points
    }

    /// Landmarks in symmetric `[-1,1]` coordinates.
    pub fn symmetric_points(&self) -> Vec<Pt2> {
        self.points.iter().map(unit_to_symmetric).collect()
    }

    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).and_then(|l| l.as_deref())
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Template raster size `(width, height)`, if declared.
    pub fn size(&self) -> Option<(Real, Real)> {
        self.size.map(|[w, h]| (w as Real, h as Real))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
