//! Batch preparation of a prediction file for annotation.
//!
//! Every frame of one video's prediction file is run through
//! [`find_optimal_poi`]; the output keeps the predicted landmarks with cold
//! ones replaced by `(-1, -1)`, plus the re-fitted template→frame homography.

use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use pitchmap_core::Real;
use pitchmap_poi::{find_optimal_poi, PoiConfig, PoiError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::predictions::{FramePrediction, PredictionError, Predictions};
use crate::template::PitchTemplate;
use crate::{mat3_to_rows, COLD_POINT};

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a frame was left out of the prepared output.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error(transparent)]
    Poi(#[from] PoiError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    pub poi: PoiConfig,
    /// Process only the first `limit` frames, in frame-id order.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedFrame {
    /// Template→frame homography, unit-square units on both sides.
    pub theta: [[Real; 3]; 3],
    pub poi: Vec<[Real; 2]>,
    pub score: Option<Real>,
}

#[derive(Debug)]
pub struct SkippedFrame {
    pub frame: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct PrepareReport {
    pub frames: BTreeMap<String, PreparedFrame>,
    pub skipped: Vec<SkippedFrame>,
}

impl PrepareReport {
    /// Frames considered, prepared or skipped.
    pub fn processed(&self) -> usize {
        self.frames.len() + self.skipped.len()
    }
}

fn prepare_frame(
    template: &PitchTemplate,
    prediction: &FramePrediction,
    config: &PoiConfig,
) -> Result<PreparedFrame, SkipReason> {
    prediction.check_len(template.len())?;
    let predicted = prediction.template_to_observed()?;
    let observed = prediction.points();
    let optimal = find_optimal_poi(&predicted, &observed, template.points(), config)?;

    let poi = prediction
        .poi
        .iter()
        .zip(optimal.hot.iter())
        .map(|(p, hot)| if hot { *p } else { COLD_POINT })
        .collect();
    Ok(PreparedFrame {
        theta: mat3_to_rows(&optimal.homography),
        poi,
        score: prediction.score,
    })
}

/// Run optimal PoI selection over every frame of `predictions`.
///
/// Frames that fail (wrong point count, singular stored homography, failed
/// reduction or fit) are skipped and listed in the report.
pub fn prepare_predictions(
    template: &PitchTemplate,
    predictions: &Predictions,
    options: &PrepareOptions,
) -> Result<PrepareReport, PoiError> {
    options.poi.validate()?;
    let limit = options.limit.unwrap_or(usize::MAX);

    let mut report = PrepareReport::default();
    for (frame, prediction) in predictions.iter().take(limit) {
        match prepare_frame(template, prediction, &options.poi) {
            Ok(prepared) => {
                report.frames.insert(frame.clone(), prepared);
            }
            Err(reason) => {
                warn!("skipping frame {frame}: {reason}");
                report.skipped.push(SkippedFrame {
                    frame: frame.clone(),
                    reason,
                });
            }
        }
    }
    info!(
        "prepared {} frames, skipped {}",
        report.frames.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Write prepared frames as pretty-printed JSON.
pub fn write_prepared(
    path: &Path,
    frames: &BTreeMap<String, PreparedFrame>,
) -> Result<(), PrepareError> {
    let io_err = |source| PrepareError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = std::fs::File::create(path).map_err(io_err)?;
    write_prepared_to(file, frames).map_err(io_err)
}

/// Write prepared frames as pretty-printed JSON to `writer`, flushing it.
pub fn write_prepared_to<W: Write>(
    writer: W,
    frames: &BTreeMap<String, PreparedFrame>,
) -> io::Result<()> {
    let mut w = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut w, frames)?;
    w.flush()
}
