//! Frames: one drawing in a scene's sequence.

use super::element::{Element, ElementId};
use super::scene::SceneId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for frames.
pub type FrameId = Uuid;

/// A single drawing. Element order is paint order, back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: FrameId,
    pub scene_id: SceneId,
    pub order: usize,
    /// Number of playback ticks this frame is held for. Always at least 1.
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_duration() -> u32 {
    1
}

fn default_visible() -> bool {
    true
}

/// Options for creating a frame.
#[derive(Debug, Clone, Default)]
pub struct FrameOptions {
    /// Explicit order; appended at the end when absent.
    pub order: Option<usize>,
    pub duration: Option<u32>,
    pub elements: Vec<Element>,
    pub label: Option<String>,
    pub notes: Option<String>,
}

/// Partial update merged into an existing frame.
#[derive(Debug, Clone, Default)]
pub struct FramePatch {
    pub duration: Option<u32>,
    pub elements: Option<Vec<Element>>,
    pub thumbnail: Option<Option<String>>,
    pub label: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
}

impl FramePatch {
    pub fn elements(elements: Vec<Element>) -> Self {
        Self {
            elements: Some(elements),
            ..Self::default()
        }
    }
}

impl Frame {
    pub fn new(scene_id: SceneId, order: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            scene_id,
            order,
            duration: 1,
            elements: Vec::new(),
            thumbnail: None,
            label: None,
            notes: None,
            locked: false,
            visible: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_options(scene_id: SceneId, order: usize, options: FrameOptions) -> Self {
        let mut frame = Self::new(scene_id, order);
        frame.duration = options.duration.unwrap_or(1).max(1);
        frame.elements = options.elements;
        frame.label = options.label;
        frame.notes = options.notes;
        frame
    }

    /// Merge a patch and bump `updated_at`.
    pub fn apply(&mut self, patch: FramePatch) {
        if let Some(duration) = patch.duration {
            self.duration = duration.max(1);
        }
        if let Some(elements) = patch.elements {
            self.elements = elements;
        }
        if let Some(thumbnail) = patch.thumbnail {
            self.thumbnail = thumbnail;
        }
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        self.touch();
    }

    /// Deep copy with a fresh frame id, fresh element ids and new timestamps.
    pub fn duplicate(&self, scene_id: SceneId, order: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            scene_id,
            order,
            elements: self.elements.iter().map(Element::duplicate).collect(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geometry;

    #[test]
    fn test_defaults() {
        let frame = Frame::new(Uuid::new_v4(), 0);
        assert_eq!(frame.duration, 1);
        assert!(frame.visible);
        assert!(!frame.locked);
    }

    #[test]
    fn test_patch_keeps_duration_positive() {
        let mut frame = Frame::new(Uuid::new_v4(), 0);
        frame.apply(FramePatch {
            duration: Some(0),
            label: Some(Some("key".to_string())),
            ..FramePatch::default()
        });
        assert_eq!(frame.duration, 1);
        assert_eq!(frame.label.as_deref(), Some("key"));
    }

    #[test]
    fn test_duplicate_regenerates_ids() {
        let mut frame = Frame::new(Uuid::new_v4(), 0);
        frame.elements.push(Element::new(Geometry::Rect {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        }));
        let copy = frame.duplicate(frame.scene_id, 1);
        assert_ne!(copy.id, frame.id);
        assert_ne!(copy.elements[0].id, frame.elements[0].id);
        assert!(copy.elements[0].same_content(&frame.elements[0]));
        assert_eq!(copy.order, 1);
    }

    #[test]
    fn test_dates_round_trip_as_iso_strings() {
        let frame = Frame::new(Uuid::new_v4(), 0);
        let json = serde_json::to_value(&frame).unwrap();
        assert!(json["createdAt"].is_string());
        let back: Frame = serde_json::from_value(json).unwrap();
        assert_eq!(back.created_at, frame.created_at);
    }
}
