//! Cellframe Core Library
//!
//! Platform-agnostic scene graph, drawing tools, selection and playback for
//! the Cellframe frame-by-frame animation editor.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod drawing;
pub mod error;
pub mod geometry;
pub mod input;
pub mod model;
pub mod notify;
pub mod onion;
pub mod path;
pub mod playback;
pub mod selection;
pub mod signal;
pub mod storage;
pub mod store;
pub mod timeline;
pub mod tools;
pub mod undo;

pub use camera::Camera;
pub use canvas::{Canvas, PointerUpOutcome};
pub use config::EditorConfig;
pub use drawing::{DrawOptions, DrawingProperties, draw_shape, path_from_points};
pub use error::{EditorError, EditorResult, EntityKind};
pub use input::{Command, Keymap, Modifiers, MouseButton, PointerEvent};
pub use model::{Element, Frame, Geometry, Project, Scene};
pub use notify::{LogNotifier, NotificationLevel, Notifier};
pub use onion::{OnionLayer, OnionSkinConfig};
pub use playback::{ManualScheduler, Playback, Scheduler, TickOutcome};
pub use selection::{SelectionManager, hit_test};
pub use signal::{Observable, SubscriptionId};
pub use store::SceneGraph;
pub use timeline::{PlaybackDirection, PlaybackStatus, Timeline, TimelineState};
pub use tools::{ToolKind, ToolManager};
pub use undo::UndoStack;
