//! Tool selection and the drawing gesture state machine.

use crate::model::Element;
use crate::signal::{Observable, SubscriptionId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Circle,
    Ellipse,
    Line,
    Polygon,
    Star,
    Triangle,
    Pen,
    Pencil,
    Brush,
    Eraser,
    Eyedropper,
    Pan,
}

impl ToolKind {
    /// Tools listed in the toolbar, in display order.
    pub const TOOLBAR: [ToolKind; 11] = [
        ToolKind::Select,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Ellipse,
        ToolKind::Line,
        ToolKind::Pen,
        ToolKind::Pencil,
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Eyedropper,
        ToolKind::Pan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Line => "Line",
            ToolKind::Polygon => "Polygon",
            ToolKind::Star => "Star",
            ToolKind::Triangle => "Triangle",
            ToolKind::Pen => "Pen",
            ToolKind::Pencil => "Pencil",
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Eyedropper => "Eyedropper",
            ToolKind::Pan => "Pan",
        }
    }

    /// Single-key shortcut. Eraser shares `E` with the ellipse, which wins on lookup.
    pub fn shortcut(self) -> Option<char> {
        match self {
            ToolKind::Select => Some('V'),
            ToolKind::Rectangle => Some('R'),
            ToolKind::Circle => Some('C'),
            ToolKind::Ellipse | ToolKind::Eraser => Some('E'),
            ToolKind::Line => Some('L'),
            ToolKind::Pen => Some('P'),
            ToolKind::Pencil => Some('N'),
            ToolKind::Brush => Some('B'),
            ToolKind::Eyedropper => Some('I'),
            ToolKind::Pan => Some('H'),
            ToolKind::Polygon | ToolKind::Star | ToolKind::Triangle => None,
        }
    }

    /// CSS cursor name shown while the tool is active.
    pub fn cursor(self) -> &'static str {
        match self {
            ToolKind::Select => "default",
            ToolKind::Pan => "grab",
            _ => "crosshair",
        }
    }

    /// Tools that accumulate sampled points into a path.
    pub fn is_freehand(self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Pencil | ToolKind::Brush)
    }

    /// Tools that build a shape from the gesture's start and end points.
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle
                | ToolKind::Circle
                | ToolKind::Ellipse
                | ToolKind::Line
                | ToolKind::Polygon
                | ToolKind::Star
                | ToolKind::Triangle
        )
    }
}

/// Look up a toolbar tool by its keyboard shortcut (case-insensitive).
pub fn tool_by_shortcut(key: char) -> Option<ToolKind> {
    let key = key.to_ascii_uppercase();
    ToolKind::TOOLBAR
        .into_iter()
        .find(|tool| tool.shortcut() == Some(key))
}

/// Phase of the current pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture has started, or the last one was cancelled.
    #[default]
    Idle,
    /// Pointer is down and the tool is drawing.
    Drawing { start: Point, current: Point },
    /// Pointer was released. The points stay readable until the next
    /// gesture starts or the caller cancels.
    Ended { start: Point, current: Point },
}

/// Observable tool state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolState {
    pub active_tool: ToolKind,
    pub gesture: Gesture,
    /// Sampled points for freehand tools. Cleared by the caller after finalizing.
    pub path_points: Vec<Point>,
    /// Shape preview shown while drawing.
    pub preview: Option<Element>,
}

impl ToolState {
    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Drawing { .. })
    }

    pub fn start_point(&self) -> Option<Point> {
        match self.gesture {
            Gesture::Drawing { start, .. } | Gesture::Ended { start, .. } => Some(start),
            Gesture::Idle => None,
        }
    }

    pub fn current_point(&self) -> Option<Point> {
        match self.gesture {
            Gesture::Drawing { current, .. } | Gesture::Ended { current, .. } => Some(current),
            Gesture::Idle => None,
        }
    }
}

/// Manages the current tool and its gesture.
#[derive(Debug, Default)]
pub struct ToolManager {
    state: Observable<ToolState>,
}

impl ToolManager {
    /// Create a new tool manager with the select tool active.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ToolState {
        self.state.get()
    }

    pub fn active_tool(&self) -> ToolKind {
        self.state.get().active_tool
    }

    pub fn is_drawing(&self) -> bool {
        self.state.get().is_drawing()
    }

    pub fn start_point(&self) -> Option<Point> {
        self.state.get().start_point()
    }

    pub fn current_point(&self) -> Option<Point> {
        self.state.get().current_point()
    }

    pub fn path_points(&self) -> &[Point] {
        &self.state.get().path_points
    }

    pub fn preview(&self) -> Option<&Element> {
        self.state.get().preview.as_ref()
    }

    /// Notify `callback` after every tool state change.
    pub fn subscribe(&mut self, callback: impl FnMut(&ToolState) + 'static) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Switch tools. Any gesture in progress is cancelled first.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.active_tool() != tool {
            self.cancel_drawing();
            log::debug!("Tool switched to {}", tool.name());
        }
        self.state.update(|s| s.active_tool = tool);
    }

    /// Begin a gesture. Ignored while another gesture is drawing.
    pub fn start_drawing(&mut self, point: Point) -> bool {
        if self.is_drawing() {
            return false;
        }
        self.state.update(|s| {
            s.gesture = Gesture::Drawing {
                start: point,
                current: point,
            };
            s.preview = None;
            if s.active_tool.is_freehand() {
                s.path_points.clear();
                s.path_points.push(point);
            }
        });
        true
    }

    /// Move the gesture's current point. Freehand tools also record the point.
    pub fn continue_drawing(&mut self, point: Point) {
        if !self.is_drawing() {
            return;
        }
        self.state.update(|s| {
            if let Gesture::Drawing { current, .. } = &mut s.gesture {
                *current = point;
            }
            if s.active_tool.is_freehand() {
                s.path_points.push(point);
            }
        });
    }

    /// Finish the gesture and return its start and end points. Path points
    /// are left for the caller to consume and clear.
    pub fn end_drawing(&mut self, point: Point) -> Option<(Point, Point)> {
        let Gesture::Drawing { start, .. } = self.state.get().gesture else {
            return None;
        };
        self.state.update(|s| {
            s.gesture = Gesture::Ended {
                start,
                current: point,
            };
            s.preview = None;
        });
        Some((start, point))
    }

    /// Drop the gesture, its preview and its sampled points without producing a shape.
    pub fn cancel_drawing(&mut self) {
        let state = self.state.get();
        if state.gesture == Gesture::Idle && state.path_points.is_empty() && state.preview.is_none()
        {
            return;
        }
        self.state.update(|s| {
            s.gesture = Gesture::Idle;
            s.path_points.clear();
            s.preview = None;
        });
    }

    pub fn add_path_point(&mut self, point: Point) {
        self.state.update(|s| s.path_points.push(point));
    }

    /// Take the sampled points, leaving the list empty.
    pub fn take_path_points(&mut self) -> Vec<Point> {
        self.state.update(|s| std::mem::take(&mut s.path_points))
    }

    pub fn clear_path_points(&mut self) {
        self.state.update(|s| s.path_points.clear());
    }

    pub fn set_preview(&mut self, preview: Option<Element>) {
        self.state.update(|s| s.preview = preview);
    }
}
