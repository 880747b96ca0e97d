//! Scenes: ordered frame sequences within a project.

use super::frame::Frame;
use super::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scenes.
pub type SceneId = Uuid;

/// Nominal scene length in frames when none is given.
pub const DEFAULT_SCENE_DURATION: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub project_id: ProjectId,
    pub name: String,
    pub duration: u32,
    pub order: usize,
    #[serde(default)]
    pub frames: Vec<Frame>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneOptions {
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub order: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ScenePatch {
    pub name: Option<String>,
    pub duration: Option<u32>,
}

impl Scene {
    pub fn new(project_id: ProjectId, order: usize, options: SceneOptions) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            name: options
                .name
                .unwrap_or_else(|| format!("Scene {}", order + 1)),
            duration: options.duration.unwrap_or(DEFAULT_SCENE_DURATION),
            order,
            frames: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ScenePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        self.touch();
    }

    /// Deep copy under `project_id` with fresh ids throughout. The name is kept.
    pub fn deep_copy(&self, project_id: ProjectId, order: usize) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Self {
            id,
            project_id,
            order,
            frames: self
                .frames
                .iter()
                .map(|f| f.duplicate(id, f.order))
                .collect(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Copy within the same project, named "<name> (Copy)".
    pub fn duplicate(&self, order: usize) -> Self {
        let mut copy = self.deep_copy(self.project_id, order);
        copy.name = format!("{} (Copy)", self.name);
        copy
    }

    /// Sort frames by order and renumber them 0..n.
    pub fn normalize_frame_order(&mut self) {
        self.frames.sort_by_key(|f| f.order);
        for (index, frame) in self.frames.iter_mut().enumerate() {
            frame.order = index;
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
