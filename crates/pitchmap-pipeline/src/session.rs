//! Multi-frame annotation session with bounded undo.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, warn};
use pitchmap_core::{Pt2, ReferenceResolution};

use crate::frame::{AnnotationError, FrameAnnotation, FrameDelta, FrameExport};
use crate::predictions::{placeholder_points, Predictions};
use crate::template::PitchTemplate;

/// Maximum number of point edits kept for undo.
pub const EDIT_HISTORY_CAPACITY: usize = 50;

/// State of one landmark before an edit.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PointEdit {
    point: usize,
    coords: Pt2,
    hot: bool,
}

#[derive(Debug, Clone)]
pub struct AnnotationSession {
    template: PitchTemplate,
    reference: ReferenceResolution,
    frames: Vec<FrameAnnotation>,
    current: usize,
    history: VecDeque<PointEdit>,
}

impl AnnotationSession {
    /// Build a session. Every frame must have one landmark per template point.
    pub fn new(
        template: PitchTemplate,
        frames: Vec<FrameAnnotation>,
        reference: ReferenceResolution,
    ) -> Result<Self, AnnotationError> {
        if let Some(bad) = frames.iter().find(|f| f.len() != template.len()) {
            return Err(AnnotationError::PointCount {
                frame: bad.name().to_string(),
                got: bad.len(),
                expected: template.len(),
            });
        }
        let mut session = Self {
            template,
            reference,
            frames,
            current: 0,
            history: VecDeque::with_capacity(EDIT_HISTORY_CAPACITY),
        };
        session.refresh_current();
        Ok(session)
    }

    /// Session over `names`, seeded from `predictions`.
    ///
    /// Frames without a usable prediction start with every landmark cold.
    pub fn from_predictions<I, S>(
        template: PitchTemplate,
        names: I,
        predictions: &Predictions,
        reference: ReferenceResolution,
    ) -> Result<Self, AnnotationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let len = template.len();
        let frames = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                match predictions.get(&name) {
                    Some(pred) if pred.check_len(len).is_ok() => {
                        FrameAnnotation::new(name, pred.points(), pred.score)
                    }
                    Some(pred) => {
                        warn!(
                            "frame {name}: prediction has {} points, expected {len}",
                            pred.poi.len()
                        );
                        FrameAnnotation::new(name, placeholder_points(len), None)
                    }
                    None => FrameAnnotation::new(name, placeholder_points(len), None),
                }
            })
            .collect();
        Self::new(template, frames, reference)
    }

    pub fn template(&self) -> &PitchTemplate {
        &self.template
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[FrameAnnotation] {
        &self.frames
    }

    pub fn frame(&self, idx: usize) -> Option<&FrameAnnotation> {
        self.frames.get(idx)
    }

    pub fn frame_index(&self, name: &str) -> Option<usize> {
        self.frames.iter().position(|f| f.name() == name)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Result<&FrameAnnotation, AnnotationError> {
        self.frames.get(self.current).ok_or(AnnotationError::NoFrames)
    }

    fn current_mut(&mut self) -> Result<&mut FrameAnnotation, AnnotationError> {
        self.frames
            .get_mut(self.current)
            .ok_or(AnnotationError::NoFrames)
    }

    fn refresh_current(&mut self) {
        let reference = self.reference;
        if let Some(frame) = self.frames.get_mut(self.current) {
            frame.refresh(self.template.points(), reference);
        }
    }

    /// Number of edits that can be undone.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Jump to frame `idx`, clamped to the valid range. Clears undo history.
    pub fn set_frame(&mut self, idx: usize) -> usize {
        self.current = idx.min(self.frames.len().saturating_sub(1));
        self.history.clear();
        self.refresh_current();
        self.current
    }

    pub fn next_frame(&mut self) -> usize {
        self.set_frame(self.current.saturating_add(1))
    }

    pub fn prev_frame(&mut self) -> usize {
        self.set_frame(self.current.saturating_sub(1))
    }

    /// Index after `point`, wrapping around.
    pub fn next_point(&self, point: usize) -> usize {
        match self.template.len() {
            0 => 0,
            n => (point + 1) % n,
        }
    }

    /// Index before `point`, wrapping around.
    pub fn prev_point(&self, point: usize) -> usize {
        match self.template.len() {
            0 => 0,
            n => (point + n - 1) % n,
        }
    }

    fn record(&mut self, point: usize) -> Result<(), AnnotationError> {
        let frame = self.current()?;
        let edit = PointEdit {
            point,
            coords: frame.point_coords(point)?,
            hot: frame.is_point_hot(point)?,
        };
        if self.history.len() == EDIT_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(edit);
        Ok(())
    }

    /// Move a landmark of the current frame.
    pub fn set_point_coords(&mut self, point: usize, coords: Pt2) -> Result<(), AnnotationError> {
        self.record(point)?;
        self.current_mut()?.set_point_coords(point, coords)?;
        self.refresh_current();
        Ok(())
    }

    /// Set or toggle a landmark of the current frame. Re-enabled landmarks
    /// snap to the projected template.
    pub fn set_point_state(
        &mut self,
        point: usize,
        hot: Option<bool>,
    ) -> Result<bool, AnnotationError> {
        self.record(point)?;
        let state = self.current_mut()?.set_point_state(point, hot, true)?;
        self.refresh_current();
        Ok(state)
    }

    /// Mark every landmark of the current frame cold.
    pub fn clear_points(&mut self) -> Result<(), AnnotationError> {
        self.current_mut()?.clear();
        self.refresh_current();
        Ok(())
    }

    /// Revert the most recent point edit. Returns `false` if there is none.
    pub fn undo(&mut self) -> Result<bool, AnnotationError> {
        let Some(edit) = self.history.pop_back() else {
            return Ok(false);
        };
        let frame = self.current_mut()?;
        frame.set_point_coords(edit.point, edit.coords)?;
        frame.set_point_state(edit.point, Some(edit.hot), false)?;
        self.refresh_current();
        debug!("undo edit of point {}", edit.point);
        Ok(true)
    }

    pub fn add_elapsed(&mut self, seconds: f64) -> Result<(), AnnotationError> {
        self.current_mut()?.add_elapsed(seconds);
        Ok(())
    }

    /// Export every frame, keyed by name.
    pub fn export(&self) -> BTreeMap<String, FrameExport> {
        self.frames
            .iter()
            .map(|f| (f.name().to_string(), f.export()))
            .collect()
    }

    /// Collect unsaved changes of every frame.
    pub fn take_changes(&mut self) -> BTreeMap<String, FrameDelta> {
        self.frames
            .iter_mut()
            .filter_map(|f| f.take_changes().map(|d| (f.name().to_string(), d)))
            .collect()
    }

    /// Re-apply saved changes. Unknown frame names are an error.
    pub fn apply_changes(
        &mut self,
        changes: &BTreeMap<String, FrameDelta>,
    ) -> Result<(), AnnotationError> {
        for (name, delta) in changes {
            let idx = self
                .frame_index(name)
                .ok_or_else(|| AnnotationError::UnknownFrame(name.clone()))?;
            self.frames[idx].apply_delta(delta)?;
        }
        self.refresh_current();
        Ok(())
    }
}
