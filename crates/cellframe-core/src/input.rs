//! Pointer events, modifier keys and keyboard shortcuts.

use crate::drawing::DrawOptions;
use crate::tools::{ToolKind, tool_by_shortcut};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Shift, Ctrl or Cmd: add to or toggle within the selection.
    pub fn additive(self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Shape construction options: Shift constrains, Alt draws from center.
    pub fn draw_options(self) -> DrawOptions {
        DrawOptions {
            constrain_proportions: self.shift,
            draw_from_center: self.alt,
        }
    }
}

/// Pointer event in client coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

/// Editor actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetTool(ToolKind),
    Undo,
    DeleteSelected,
    SelectAll,
    /// Cancel the gesture or drag in progress and clear the selection.
    Escape,
    ToggleFill,
    /// Black fill, no stroke.
    ResetColors,
    FillOpacity(f64),
    StrokeWidthBy(f64),
}

/// A key plus the modifiers that must be held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Shortcut {
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::key(key)
        }
    }

    /// Cmd counts as Ctrl.
    pub fn from_event(key: &str, modifiers: Modifiers) -> Self {
        Self {
            key: key.to_lowercase(),
            ctrl: modifiers.command(),
            shift: modifiers.shift,
            alt: modifiers.alt,
        }
    }
}

/// Keyboard shortcut table.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<Shortcut, Command>,
    enabled: bool,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
            enabled: true,
        }
    }
}

impl Keymap {
    /// Empty keymap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool letters, undo, delete, select-all, color and opacity keys.
    pub fn drawing() -> Self {
        let mut keymap = Self::new();
        for tool in ToolKind::TOOLBAR {
            // Shared letters go to the first tool that claims them
            if let Some(key) = tool.shortcut().filter(|k| tool_by_shortcut(*k) == Some(tool)) {
                keymap.register(Shortcut::key(&key.to_string()), Command::SetTool(tool));
            }
        }
        keymap.register(Shortcut::ctrl("z"), Command::Undo);
        keymap.register(Shortcut::ctrl("a"), Command::SelectAll);
        keymap.register(Shortcut::key("delete"), Command::DeleteSelected);
        keymap.register(Shortcut::key("backspace"), Command::DeleteSelected);
        keymap.register(Shortcut::key("escape"), Command::Escape);
        keymap.register(Shortcut::key("/"), Command::ToggleFill);
        keymap.register(Shortcut::key("d"), Command::ResetColors);
        keymap.register(Shortcut::key("["), Command::StrokeWidthBy(-1.0));
        keymap.register(Shortcut::key("]"), Command::StrokeWidthBy(1.0));
        for digit in 0..=9u8 {
            let opacity = if digit == 0 { 1.0 } else { f64::from(digit) / 10.0 };
            keymap.register(Shortcut::key(&digit.to_string()), Command::FillOpacity(opacity));
        }
        keymap
    }

    /// Bind a shortcut, replacing any previous binding.
    pub fn register(&mut self, shortcut: Shortcut, command: Command) -> Option<Command> {
        self.bindings.insert(shortcut, command)
    }

    pub fn unregister(&mut self, shortcut: &Shortcut) -> Option<Command> {
        self.bindings.remove(shortcut)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Command bound to a key press. Nothing resolves while a text input
    /// has focus or the keymap is disabled.
    pub fn resolve(&self, key: &str, modifiers: Modifiers, text_input_focused: bool) -> Option<Command> {
        if !self.enabled || text_input_focused {
            return None;
        }
        self.bindings
            .get(&Shortcut::from_event(key, modifiers))
            .copied()
    }
}
