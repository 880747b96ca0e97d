//! Undo history for drawn elements.

use crate::error::{EditorError, EditorResult, EntityKind};
use crate::model::{ElementId, FrameId, ProjectId, SceneId};
use crate::store::SceneGraph;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::VecDeque;

pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// An element that was added to a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoAction {
    pub project_id: ProjectId,
    pub scene_id: SceneId,
    pub frame_id: FrameId,
    pub element_id: ElementId,
    pub recorded_at: DateTime<Utc>,
}

/// Linear undo stack. The oldest entry is dropped once `depth` is exceeded.
#[derive(Debug)]
pub struct UndoStack {
    actions: VecDeque<UndoAction>,
    depth: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_depth(DEFAULT_UNDO_DEPTH)
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            actions: VecDeque::new(),
            depth: depth.max(1),
        }
    }

    pub fn record_element_added(
        &mut self,
        project_id: ProjectId,
        scene_id: SceneId,
        frame_id: FrameId,
        element_id: ElementId,
    ) {
        self.actions.push_back(UndoAction {
            project_id,
            scene_id,
            frame_id,
            element_id,
            recorded_at: Utc::now(),
        });
        while self.actions.len() > self.depth {
            self.actions.pop_front();
        }
        debug!("Recorded element {element_id}, {} undo steps", self.actions.len());
    }

    pub fn can_undo(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn peek(&self) -> Option<&UndoAction> {
        self.actions.back()
    }

    /// Pop the latest action and remove its element through the store.
    ///
    /// The action is consumed even when the element or frame is already
    /// gone; the error reports what was missing.
    pub fn undo(&mut self, store: &mut SceneGraph) -> EditorResult<UndoAction> {
        let action = self
            .actions
            .pop_back()
            .ok_or_else(|| EditorError::InvalidOperation("nothing to undo".to_string()))?;
        if store.get_frame(action.frame_id).is_none() {
            return Err(EditorError::not_found(EntityKind::Frame, action.frame_id));
        }
        store.remove_element(action.frame_id, action.element_id)?;
        info!("Undid element {} in frame {}", action.element_id, action.frame_id);
        Ok(action)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Forget the steps that added an element which has since been removed.
    pub fn clear_for_element(&mut self, element_id: ElementId) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| a.element_id != element_id);
        before - self.actions.len()
    }

    /// Forget the history of one frame, e.g. after the frame was deleted.
    pub fn clear_for_frame(&mut self, frame_id: FrameId) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| a.frame_id != frame_id);
        let removed = before - self.actions.len();
        if removed > 0 {
            debug!("Dropped {removed} undo steps for frame {frame_id}");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, FrameOptions, Geometry, ProjectOptions, SceneOptions};

    fn setup() -> (SceneGraph, ProjectId, SceneId, FrameId) {
        let mut store = SceneGraph::new();
        let project_id = store.create_project(ProjectOptions::default()).unwrap().id;
        let scene_id = store
            .create_scene(project_id, SceneOptions::default())
            .unwrap()
            .id;
        let frame_id = store
            .create_frame(scene_id, FrameOptions::default())
            .unwrap()
            .id;
        (store, project_id, scene_id, frame_id)
    }

    fn line() -> Element {
        Element::new(Geometry::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 5.0,
            y2: 5.0,
        })
    }

    #[test]
    fn test_undo_removes_element() {
        let (mut store, project_id, scene_id, frame_id) = setup();
        let mut undo = UndoStack::new();
        let id = store.add_element(frame_id, line()).unwrap();
        undo.record_element_added(project_id, scene_id, frame_id, id);

        assert!(undo.can_undo());
        let action = undo.undo(&mut store).unwrap();
        assert_eq!(action.element_id, id);
        assert!(store.get_frame(frame_id).unwrap().elements.is_empty());
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_undo_empty_stack() {
        let (mut store, ..) = setup();
        let mut undo = UndoStack::new();
        assert!(matches!(
            undo.undo(&mut store),
            Err(EditorError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_depth_drops_oldest() {
        let (_, project_id, scene_id, frame_id) = setup();
        let mut undo = UndoStack::with_depth(3);
        let ids: Vec<ElementId> = (0..5).map(|_| uuid::Uuid::new_v4()).collect();
        for id in &ids {
            undo.record_element_added(project_id, scene_id, frame_id, *id);
        }
        assert_eq!(undo.len(), 3);
        assert_eq!(undo.peek().map(|a| a.element_id), Some(ids[4]));
    }

    #[test]
    fn test_missing_element_still_consumed() {
        let (mut store, project_id, scene_id, frame_id) = setup();
        let mut undo = UndoStack::new();
        undo.record_element_added(project_id, scene_id, frame_id, uuid::Uuid::new_v4());
        assert!(undo.undo(&mut store).is_err());
        assert!(undo.is_empty());
    }

    #[test]
    fn test_clear_for_frame() {
        let (_, project_id, scene_id, frame_id) = setup();
        let mut undo = UndoStack::new();
        let other = uuid::Uuid::new_v4();
        undo.record_element_added(project_id, scene_id, frame_id, uuid::Uuid::new_v4());
        undo.record_element_added(project_id, scene_id, other, uuid::Uuid::new_v4());
        assert_eq!(undo.clear_for_frame(frame_id), 1);
        assert_eq!(undo.peek().map(|a| a.frame_id), Some(other));
        undo.clear();
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_clear_for_element() {
        let (_, project_id, scene_id, frame_id) = setup();
        let mut undo = UndoStack::new();
        let kept = uuid::Uuid::new_v4();
        let erased = uuid::Uuid::new_v4();
        undo.record_element_added(project_id, scene_id, frame_id, kept);
        undo.record_element_added(project_id, scene_id, frame_id, erased);
        assert_eq!(undo.clear_for_element(erased), 1);
        assert_eq!(undo.peek().map(|a| a.element_id), Some(kept));
    }
}
