//! Projects and project templates.

use super::scene::{Scene, SceneId};
use crate::error::{EditorError, EditorResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for projects.
pub type ProjectId = Uuid;

pub const MIN_FRAME_RATE: u32 = 1;
pub const MAX_FRAME_RATE: u32 = 60;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn to_size(self) -> kurbo::Size {
        kurbo::Size::new(self.width as f64, self.height as f64)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Canvas presets offered when creating a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectTemplate {
    #[serde(rename = "1080p")]
    FullHd,
    #[serde(rename = "4k")]
    UltraHd,
    #[serde(rename = "720p")]
    Hd,
    #[serde(rename = "instagram-square")]
    InstagramSquare,
    #[serde(rename = "instagram-story")]
    InstagramStory,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "custom")]
    Custom,
}

impl ProjectTemplate {
    pub const ALL: [ProjectTemplate; 7] = [
        ProjectTemplate::FullHd,
        ProjectTemplate::UltraHd,
        ProjectTemplate::Hd,
        ProjectTemplate::InstagramSquare,
        ProjectTemplate::InstagramStory,
        ProjectTemplate::TikTok,
        ProjectTemplate::Custom,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ProjectTemplate::FullHd => "1080p",
            ProjectTemplate::UltraHd => "4k",
            ProjectTemplate::Hd => "720p",
            ProjectTemplate::InstagramSquare => "instagram-square",
            ProjectTemplate::InstagramStory => "instagram-story",
            ProjectTemplate::TikTok => "tiktok",
            ProjectTemplate::Custom => "custom",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            ProjectTemplate::FullHd => "1080p (Full HD)",
            ProjectTemplate::UltraHd => "4K (Ultra HD)",
            ProjectTemplate::Hd => "720p (HD)",
            ProjectTemplate::InstagramSquare => "Instagram Square",
            ProjectTemplate::InstagramStory => "Instagram Story",
            ProjectTemplate::TikTok => "TikTok",
            ProjectTemplate::Custom => "Custom",
        }
    }

    pub fn dimensions(self) -> Dimensions {
        match self {
            ProjectTemplate::FullHd | ProjectTemplate::Custom => Dimensions::new(1920, 1080),
            ProjectTemplate::UltraHd => Dimensions::new(3840, 2160),
            ProjectTemplate::Hd => Dimensions::new(1280, 720),
            ProjectTemplate::InstagramSquare => Dimensions::new(1080, 1080),
            ProjectTemplate::InstagramStory | ProjectTemplate::TikTok => {
                Dimensions::new(1080, 1920)
            }
        }
    }

    pub fn frame_rate(self) -> u32 {
        match self {
            ProjectTemplate::Hd => 24,
            _ => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dimensions: Dimensions,
    pub frame_rate: u32,
    pub background_color: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProjectMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub frame_rate: Option<u32>,
    pub background_color: Option<String>,
    pub template: Option<ProjectTemplate>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub frame_rate: Option<u32>,
    pub background_color: Option<String>,
    pub thumbnail: Option<Option<String>>,
}

impl Project {
    /// Build a project, filling gaps from the template (if any) and then the defaults.
    pub fn new(options: ProjectOptions) -> EditorResult<Self> {
        let template = options.template;
        let dimensions = options
            .dimensions
            .or(template.map(ProjectTemplate::dimensions))
            .unwrap_or_default();
        let frame_rate = options
            .frame_rate
            .or(template.map(ProjectTemplate::frame_rate))
            .unwrap_or(30);
        validate_dimensions(dimensions)?;
        validate_frame_rate(frame_rate)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: options
                .name
                .unwrap_or_else(|| "Untitled Project".to_string()),
            description: options.description.unwrap_or_default(),
            dimensions,
            frame_rate,
            background_color: options
                .background_color
                .unwrap_or_else(|| "#FFFFFF".to_string()),
            scenes: Vec::new(),
            thumbnail: None,
            metadata: template.map(|t| ProjectMetadata {
                template: Some(t.id().to_string()),
            }),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn from_template(template: ProjectTemplate, name: impl Into<String>) -> EditorResult<Self> {
        Self::new(ProjectOptions {
            name: Some(name.into()),
            template: Some(template),
            ..ProjectOptions::default()
        })
    }

    /// Merge a patch. Invalid dimensions or frame rate reject the whole patch.
    pub fn apply(&mut self, patch: ProjectPatch) -> EditorResult<()> {
        if let Some(dimensions) = patch.dimensions {
            validate_dimensions(dimensions)?;
        }
        if let Some(frame_rate) = patch.frame_rate {
            validate_frame_rate(frame_rate)?;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(dimensions) = patch.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(frame_rate) = patch.frame_rate {
            self.frame_rate = frame_rate;
        }
        if let Some(color) = patch.background_color {
            self.background_color = color;
        }
        if let Some(thumbnail) = patch.thumbnail {
            self.thumbnail = thumbnail;
        }
        self.touch();
        Ok(())
    }

    /// Sort scenes by order and renumber them 0..n.
    pub fn normalize_scene_order(&mut self) {
        self.scenes.sort_by_key(|s| s.order);
        for (index, scene) in self.scenes.iter_mut().enumerate() {
            scene.order = index;
        }
    }

    pub fn frame_count(&self) -> usize {
        self.scenes.iter().map(|s| s.frames.len()).sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Deep copy with a new name and fresh ids for every nested entity.
    pub fn deep_copy(&self, name: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Self {
            id,
            name: name.into(),
            scenes: self
                .scenes
                .iter()
                .map(|s| s.deep_copy(id, s.order))
                .collect(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn validate_dimensions(dimensions: Dimensions) -> EditorResult<()> {
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(EditorError::InvalidArgument(format!(
            "dimensions must be positive, got {}x{}",
            dimensions.width, dimensions.height
        )));
    }
    Ok(())
}

fn validate_frame_rate(frame_rate: u32) -> EditorResult<()> {
    if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&frame_rate) {
        return Err(EditorError::InvalidArgument(format!(
            "frame rate must be within {MIN_FRAME_RATE}..={MAX_FRAME_RATE}, got {frame_rate}"
        )));
    }
    Ok(())
}
