//! Project / scene / frame / element data model.

mod element;
mod frame;
mod project;
mod scene;

pub use element::{Element, ElementId, Geometry, ShapeKind, Style, Transform};
pub use frame::{Frame, FrameId, FrameOptions, FramePatch};
pub use project::{
    Dimensions, MAX_FRAME_RATE, MIN_FRAME_RATE, Project, ProjectId, ProjectMetadata,
    ProjectOptions, ProjectPatch, ProjectTemplate,
};
pub use scene::{DEFAULT_SCENE_DURATION, Scene, SceneId, SceneOptions, ScenePatch};
