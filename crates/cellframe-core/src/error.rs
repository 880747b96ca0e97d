//! Error types for editing operations.

use thiserror::Error;

/// Kind of entity an id refers to, used in [`EditorError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Scene,
    Frame,
    Element,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Project => "Project",
            EntityKind::Scene => "Scene",
            EntityKind::Frame => "Frame",
            EntityKind::Element => "Element",
        };
        f.write_str(name)
    }
}

/// Errors raised by the scene graph and the drawing tools.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Insufficient input: need at least {required} points, got {got}")]
    InsufficientInput { required: usize, got: usize },
    #[error("Parse failure: {0}")]
    ParseFailure(String),
}

impl EditorError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        EditorError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result type for editing operations.
pub type EditorResult<T> = Result<T, EditorError>;
