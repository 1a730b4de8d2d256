//! Annotation state of a single frame.
//!
//! A frame owns its landmark coordinates and hot mask. Edits mark the frame
//! modified; [`FrameAnnotation::refresh`] re-fits the homography from the hot
//! landmarks and caches the projected template and reprojection error.
//! Unlike optimal PoI selection, a frame that cannot be fitted (fewer than
//! four hot points, degenerate layout) is a normal intermediate state while a
//! user edits it: it has no homography, but keeps the last projection.

use log::debug;
use pitchmap_core::{
    is_visible, reprojection_error, transform_points, HotMask, Mat3, Pt2, Real,
    ReferenceResolution,
};
use pitchmap_linear::{fit_homography, homography_to_pixels};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{mat3_to_rows, points_from_pairs, COLD_POINT};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnnotationError {
    #[error("point index {idx} out of range for {len} points")]
    PointIndex { idx: usize, len: usize },
    #[error("frame index {idx} out of range for {len} frames")]
    FrameIndex { idx: usize, len: usize },
    #[error("unknown frame {0}")]
    UnknownFrame(String),
    #[error("session has no frames")]
    NoFrames,
    #[error("frame {frame} has {got} points, template has {expected}")]
    PointCount {
        frame: String,
        got: usize,
        expected: usize,
    },
}

/// Full export of a frame: cold landmarks are written as `(-1, -1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameExport {
    pub theta: Option<[[Real; 3]; 3]>,
    pub poi: Vec<[Real; 2]>,
    /// Annotation time in seconds, rounded to milliseconds.
    pub elapsed: Real,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
}

/// Changes of a frame relative to its loaded state.
///
/// Used both for incremental journaling and for re-applying saved work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poi: Option<Vec<[Real; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
}

impl FrameDelta {
    pub fn is_empty(&self) -> bool {
        self.poi.is_none() && self.elapsed.is_none() && self.reset.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct FrameAnnotation {
    name: String,
    points: Vec<Pt2>,
    loaded: Vec<Pt2>,
    hot: HotMask,
    score: Option<Real>,
    homography: Option<Mat3>,
    projected: Option<Vec<Pt2>>,
    error: Option<Real>,
    elapsed: Real,
    modified: bool,
    saved: bool,
    reset: bool,
}

impl FrameAnnotation {
    /// New frame with landmarks hot iff they are inside the frame.
    pub fn new(name: impl Into<String>, points: Vec<Pt2>, score: Option<Real>) -> Self {
        let hot = HotMask::from_visibility(&points);
        Self {
            name: name.into(),
            loaded: points.clone(),
            points,
            hot,
            score,
            homography: None,
            projected: None,
            error: None,
            elapsed: 0.0,
            modified: true,
            saved: true,
            reset: false,
        }
    }

    fn check_point(&self, idx: usize) -> Result<(), AnnotationError> {
        if idx >= self.points.len() {
            return Err(AnnotationError::PointIndex {
                idx,
                len: self.points.len(),
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.modified = true;
        self.saved = false;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Pt2] {
        &self.points
    }

    pub fn hot(&self) -> &HotMask {
        &self.hot
    }

    pub fn score(&self) -> Option<Real> {
        self.score
    }

    /// Template→frame homography from the last successful refresh.
    pub fn homography(&self) -> Option<&Mat3> {
        self.homography.as_ref()
    }

    /// Template landmarks projected through the last homography that could
    /// be fitted. Kept when a later refresh fails, so cleared landmarks can
    /// still be re-picked at their projected positions.
    pub fn projected(&self) -> Option<&[Pt2]> {
        self.projected.as_deref()
    }

    /// Reprojection error over hot landmarks, in reference pixels.
    pub fn error(&self) -> Option<Real> {
        self.error
    }

    pub fn elapsed(&self) -> Real {
        self.elapsed
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn is_reset(&self) -> bool {
        self.reset
    }

    /// Replace every landmark; hot flags are reseeded from visibility.
    pub fn set_points(&mut self, points: Vec<Pt2>) -> Result<(), AnnotationError> {
        if points.len() != self.points.len() {
            return Err(AnnotationError::PointCount {
                frame: self.name.clone(),
                got: points.len(),
                expected: self.points.len(),
            });
        }
        self.hot = HotMask::from_visibility(&points);
        self.points = points;
        self.touch();
        Ok(())
    }

    pub fn point_coords(&self, idx: usize) -> Result<Pt2, AnnotationError> {
        self.check_point(idx)?;
        Ok(self.points[idx])
    }

    pub fn is_point_hot(&self, idx: usize) -> Result<bool, AnnotationError> {
        self.check_point(idx)?;
        Ok(self.hot.is_hot(idx))
    }

    /// Move a landmark. Its hot flag follows its visibility.
    pub fn set_point_coords(&mut self, idx: usize, coords: Pt2) -> Result<(), AnnotationError> {
        self.check_point(idx)?;
        self.points[idx] = coords;
        self.hot.set(idx, is_visible(&coords));
        self.touch();
        Ok(())
    }

    /// Set (`Some`) or toggle (`None`) the hot flag of a landmark.
    ///
    /// With `use_projection`, a landmark switched from cold to hot takes the
    /// coordinates of the projected template landmark, if a projection exists.
    /// Returns the new state.
    pub fn set_point_state(
        &mut self,
        idx: usize,
        hot: Option<bool>,
        use_projection: bool,
    ) -> Result<bool, AnnotationError> {
        self.check_point(idx)?;
        let was_hot = self.hot.is_hot(idx);
        let now_hot = hot.unwrap_or(!was_hot);
        self.hot.set(idx, now_hot);

        if use_projection && !was_hot && now_hot {
            if let Some(projected) = &self.projected {
                self.points[idx] = projected[idx];
            }
        }
        self.touch();
        Ok(now_hot)
    }

    /// Mark every landmark cold and flag the frame as reset.
    pub fn clear(&mut self) {
        self.hot.clear();
        self.reset = true;
        self.touch();
    }

    pub fn add_elapsed(&mut self, seconds: Real) {
        self.elapsed += seconds;
        self.saved = false;
    }

    /// Re-fit the homography if the frame changed since the last refresh.
    ///
    /// `template` must be index-aligned with the frame's landmarks.
    pub fn refresh(&mut self, template: &[Pt2], reference: ReferenceResolution) {
        if !self.modified {
            return;
        }
        self.modified = false;

        match fit_homography(template, &self.points, &self.hot) {
            Ok(h) => {
                let projected = transform_points(&h, template, false);
                self.error = reprojection_error(&self.points, &projected, &self.hot, reference);
                self.homography = Some(h);
                self.projected = Some(projected);
            }
            Err(err) => {
                debug!("frame {}: no homography ({err})", self.name);
                self.homography = None;
                self.error = None;
            }
        }
    }

    /// Homography in pixel units, mapping a template raster of
    /// `template_size` onto an image of `image_size`.
    pub fn image_homography(
        &self,
        template_size: (Real, Real),
        image_size: (Real, Real),
    ) -> Option<Mat3> {
        self.homography
            .as_ref()
            .map(|h| homography_to_pixels(h, template_size, image_size))
    }

    /// Landmarks with cold ones replaced by `(-1, -1)`.
    pub fn export_points(&self) -> Vec<[Real; 2]> {
        self.points
            .iter()
            .zip(self.hot.iter())
            .map(|(p, hot)| if hot { [p.x, p.y] } else { COLD_POINT })
            .collect()
    }

    pub fn export(&self) -> FrameExport {
        FrameExport {
            theta: self.homography.as_ref().map(mat3_to_rows),
            poi: self.export_points(),
            elapsed: round_millis(self.elapsed),
            reset: self.reset,
        }
    }

    /// Changes not yet journaled; marks the frame saved.
    ///
    /// Returns `None` if the frame is already saved or nothing differs from
    /// the loaded state.
    pub fn take_changes(&mut self) -> Option<FrameDelta> {
        if self.saved {
            return None;
        }
        self.saved = true;
        let delta = FrameDelta {
            poi: (self.points != self.loaded || self.hot != HotMask::from_visibility(&self.loaded))
                .then(|| self.export_points()),
            elapsed: (self.elapsed > 0.0).then(|| round_millis(self.elapsed)),
            reset: self.reset.then_some(true),
        };
        (!delta.is_empty()).then_some(delta)
    }

    /// Re-apply previously saved changes.
    pub fn apply_delta(&mut self, delta: &FrameDelta) -> Result<(), AnnotationError> {
        if let Some(poi) = &delta.poi {
            self.set_points(points_from_pairs(poi))?;
        }
        if let Some(elapsed) = delta.elapsed {
            self.add_elapsed(elapsed);
        }
        if let Some(reset) = delta.reset {
            self.reset = reset;
        }
        Ok(())
    }
}

fn round_millis(seconds: Real) -> Real {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchmap_core::{synthetic::pitch, transform_point};

    fn template() -> Vec<Pt2> {
        pitch::grid_points_2d(3, 3)
    }

    fn warp() -> Mat3 {
        Mat3::new(0.8, 0.1, 0.05, -0.05, 0.7, 0.1, 0.1, 0.2, 1.0)
    }

    fn frame() -> FrameAnnotation {
        let pts = template()
            .iter()
            .map(|p| transform_point(&warp(), p, false))
            .collect();
        FrameAnnotation::new("f0", pts, Some(0.8))
    }

    #[test]
    fn refresh_fits_hot_points() {
        let mut f = frame();
        assert!(f.is_modified());
        f.refresh(&template(), ReferenceResolution::default());
        assert!(!f.is_modified());
        let h = f.homography().unwrap();
        assert!((h - warp()).abs().max() < 1e-9);
        assert!(f.error().unwrap() < 1e-6);
    }

    #[test]
    fn too_few_hot_points_leave_no_homography() {
        let mut f = frame();
        f.clear();
        assert!(f.is_reset());
        f.refresh(&template(), ReferenceResolution::default());
        assert!(f.homography().is_none());
        assert!(f.error().is_none());
        assert!(f.export_points().iter().all(|p| *p == COLD_POINT));
    }

    #[test]
    fn cleared_frame_repicks_at_last_projection() {
        let mut f = frame();
        f.set_point_coords(4, Pt2::new(0.05, 0.95)).unwrap();
        f.set_point_state(4, Some(false), false).unwrap();
        f.refresh(&template(), ReferenceResolution::default());
        let truth = transform_point(&warp(), &template()[4], false);

        f.clear();
        f.refresh(&template(), ReferenceResolution::default());
        assert!(f.homography().is_none());
        assert!(f.projected().is_some());

        assert!(f.set_point_state(4, Some(true), true).unwrap());
        assert!((f.point_coords(4).unwrap() - truth).norm() < 1e-9);
    }

    #[test]
    fn reenabled_point_snaps_to_projection() {
        let mut f = frame();
        f.refresh(&template(), ReferenceResolution::default());
        let expected = f.projected().unwrap()[4];

        f.set_point_coords(4, Pt2::new(2.0, 2.0)).unwrap();
        assert!(!f.is_point_hot(4).unwrap());
        f.refresh(&template(), ReferenceResolution::default());

        assert!(f.set_point_state(4, None, true).unwrap());
        assert!((f.point_coords(4).unwrap() - expected).norm() < 1e-9);
    }

    #[test]
    fn toggling_without_projection_keeps_coords() {
        let mut f = frame();
        let before = f.point_coords(2).unwrap();
        assert!(!f.set_point_state(2, Some(false), false).unwrap());
        assert!(f.set_point_state(2, None, false).unwrap());
        assert_eq!(f.point_coords(2).unwrap(), before);
    }

    #[test]
    fn out_of_range_point_is_an_error() {
        let mut f = frame();
        assert_eq!(
            f.set_point_coords(9, Pt2::origin()),
            Err(AnnotationError::PointIndex { idx: 9, len: 9 })
        );
    }

    #[test]
    fn changes_are_reported_once() {
        let mut f = frame();
        assert!(f.take_changes().is_none());

        f.add_elapsed(1.23456);
        f.set_point_state(0, Some(false), false).unwrap();
        let delta = f.take_changes().unwrap();
        assert_eq!(delta.elapsed, Some(1.235));
        assert_eq!(delta.poi.as_ref().unwrap()[0], COLD_POINT);
        assert_eq!(delta.reset, None);
        assert!(f.take_changes().is_none());

        let mut g = frame();
        g.apply_delta(&delta).unwrap();
        assert!(!g.is_point_hot(0).unwrap());
        assert_eq!(g.elapsed(), 1.235);
    }

    #[test]
    fn image_homography_is_in_pixels() {
        let mut f = frame();
        f.refresh(&template(), ReferenceResolution::default());
        let px = f.image_homography((1920.0, 1080.0), (1280.0, 720.0)).unwrap();
        let p = transform_point(&px, &Pt2::new(0.0, 0.0), false);
        let q = transform_point(&warp(), &Pt2::new(0.0, 0.0), false);
        assert!((p.x - q.x * 1280.0).abs() < 1e-6);
        assert!((p.y - q.y * 720.0).abs() < 1e-6);
    }
}
