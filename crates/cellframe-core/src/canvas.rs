//! Editing session for one project, scene and frame.
//!
//! [`Canvas`] wires pointer and keyboard input to the tool state machine,
//! the selection engine and the scene graph. Pointer positions arrive in
//! client coordinates and are mapped through the camera before use.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::drawing::{DrawingProperties, draw_shape, path_from_points};
use crate::error::{EditorError, EditorResult, EntityKind};
use crate::input::{Command, Keymap, Modifiers, MouseButton, PointerEvent};
use crate::model::{Element, ElementId, FrameId, ProjectId, SceneId};
use crate::notify::{LogNotifier, Notifier};
use crate::selection::{PointerDownAction, SelectionManager, hit_test};
use crate::store::SceneGraph;
use crate::tools::{ToolKind, ToolManager};
use crate::undo::UndoStack;
use kurbo::{Point, Size};
use log::{debug, warn};

/// What a pointer release produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerUpOutcome {
    Nothing,
    /// A new element was drawn into the active frame.
    Created(ElementId),
    /// Selected elements were moved as one commit.
    Moved(Vec<ElementId>),
}

/// Interactive editing state around a [`SceneGraph`].
pub struct Canvas<N: Notifier = LogNotifier> {
    /// The document store being edited.
    pub store: SceneGraph,
    /// View transform.
    pub camera: Camera,
    /// Style for newly drawn shapes.
    pub properties: DrawingProperties,
    /// Keyboard bindings.
    pub keymap: Keymap,
    tools: ToolManager,
    selection: SelectionManager,
    undo: UndoStack,
    notifier: N,
    config: EditorConfig,
    active_project: Option<ProjectId>,
    active_scene: Option<SceneId>,
    active_frame: Option<FrameId>,
    /// Dragged elements at their preview positions.
    drag_preview: Option<Vec<Element>>,
    /// Last client position of an active pan.
    pan_anchor: Option<Point>,
}

impl Canvas<LogNotifier> {
    pub fn new(store: SceneGraph) -> Self {
        Self::with_notifier(store, LogNotifier)
    }
}

impl<N: Notifier> Canvas<N> {
    pub fn with_notifier(store: SceneGraph, notifier: N) -> Self {
        Self::with_config(store, notifier, EditorConfig::default())
    }

    pub fn with_config(store: SceneGraph, notifier: N, config: EditorConfig) -> Self {
        Self {
            store,
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            properties: DrawingProperties::default(),
            keymap: Keymap::drawing(),
            tools: ToolManager::new(),
            selection: SelectionManager::new(),
            undo: UndoStack::with_depth(config.undo_depth),
            notifier,
            config,
            active_project: None,
            active_scene: None,
            active_frame: None,
            drag_preview: None,
            pan_anchor: None,
        }
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolManager {
        &mut self.tools
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn active_project(&self) -> Option<ProjectId> {
        self.active_project
    }

    pub fn active_scene(&self) -> Option<SceneId> {
        self.active_scene
    }

    pub fn active_frame(&self) -> Option<FrameId> {
        self.active_frame
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.active_tool()
    }

    /// Elements of the active frame, empty when none is active.
    pub fn elements(&self) -> &[Element] {
        frame_elements(&self.store, self.active_frame)
    }

    /// Dragged elements at their current preview positions.
    pub fn drag_preview(&self) -> Option<&[Element]> {
        self.drag_preview.as_deref()
    }

    /// Shape being drawn, if any.
    pub fn shape_preview(&self) -> Option<&Element> {
        self.tools.preview()
    }

    // --- navigation ---

    /// Enter a scene and activate its first frame.
    pub fn open_scene(&mut self, project_id: ProjectId, scene_id: SceneId) -> EditorResult<()> {
        let project = self
            .store
            .get_project(project_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Project, project_id))?;
        let scene = project
            .scene(scene_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Scene, scene_id))?;
        let first_frame = scene.frames.first().map(|f| f.id);

        self.leave_scene();
        self.active_project = Some(project_id);
        self.active_scene = Some(scene_id);
        if let Some(frame_id) = first_frame {
            self.set_active_frame(frame_id)?;
        }
        Ok(())
    }

    /// Switch to another frame of the active scene. Any gesture or drag in
    /// progress is abandoned first.
    pub fn set_active_frame(&mut self, frame_id: FrameId) -> EditorResult<()> {
        let scene_id = self
            .store
            .get_frame(frame_id)
            .map(|f| f.scene_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Frame, frame_id))?;
        if self.active_scene.is_some_and(|scene| scene != scene_id) {
            return Err(EditorError::InvalidArgument(format!(
                "frame {frame_id} is not part of the active scene"
            )));
        }
        self.cancel_interaction();
        self.active_project = self.store.get_scene(scene_id).map(|s| s.project_id);
        self.active_scene = Some(scene_id);
        self.active_frame = Some(frame_id);
        let elements = frame_elements(&self.store, Some(frame_id));
        self.selection.set_active_frame(frame_id, elements);
        Ok(())
    }

    /// Drop the active scene and frame together with every transient state.
    pub fn leave_scene(&mut self) {
        self.cancel_interaction();
        self.selection.reset();
        self.active_scene = None;
        self.active_frame = None;
    }

    /// Abandon the gesture, drag or pan in progress without committing it.
    pub fn cancel_interaction(&mut self) {
        self.tools.cancel_drawing();
        self.selection.cancel_interaction();
        self.drag_preview = None;
        self.pan_anchor = None;
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.tools.active_tool() {
            self.cancel_interaction();
        }
        self.tools.set_tool(tool);
    }

    // --- pointer input ---

    /// Dispatch a raw pointer event. The middle button pans with any tool.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerUpOutcome {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Middle,
                ..
            } => {
                self.cancel_interaction();
                self.pan_anchor = Some(position);
            }
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => self.pointer_down(position, modifiers),
            PointerEvent::Down { .. } => {}
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up {
                position,
                modifiers,
                ..
            } => return self.pointer_up(position, modifiers),
            PointerEvent::Scroll { position, delta } => self.wheel(position, delta.y),
        }
        PointerUpOutcome::Nothing
    }

    pub fn pointer_down(&mut self, screen_point: Point, modifiers: Modifiers) {
        let tool = self.tools.active_tool();
        if tool == ToolKind::Pan {
            self.pan_anchor = Some(screen_point);
            return;
        }

        let point = self.camera.screen_to_scene(screen_point);
        let Some(frame_id) = self.active_frame else {
            if tool != ToolKind::Select {
                self.notifier.warning("Select a frame before drawing");
            }
            return;
        };

        match tool {
            ToolKind::Select => {
                let elements = frame_elements(&self.store, Some(frame_id));
                let action = self
                    .selection
                    .pointer_down(point, modifiers.additive(), elements);
                // Selecting stays possible on a locked frame, moving does not
                if action == PointerDownAction::DragStarted && !self.ensure_editable(frame_id) {
                    self.selection.cancel_interaction();
                }
            }
            ToolKind::Eyedropper => self.pick_style(point),
            ToolKind::Eraser => {
                if self.ensure_editable(frame_id) {
                    self.erase_at(frame_id, point);
                    self.tools.start_drawing(point);
                }
            }
            _ => {
                if self.ensure_editable(frame_id) {
                    self.tools.start_drawing(point);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, screen_point: Point, modifiers: Modifiers) {
        if let Some(anchor) = self.pan_anchor {
            self.camera.pan_by(screen_point - anchor);
            self.pan_anchor = Some(screen_point);
            return;
        }

        let point = self.camera.screen_to_scene(screen_point);
        let tool = self.tools.active_tool();
        match tool {
            ToolKind::Select => {
                let elements = frame_elements(&self.store, self.active_frame);
                if let Some(moved) = self.selection.pointer_move(point, elements) {
                    self.drag_preview = Some(moved);
                }
            }
            ToolKind::Eraser if self.tools.is_drawing() => {
                if let Some(frame_id) = self.active_frame {
                    self.erase_at(frame_id, point);
                }
                self.tools.continue_drawing(point);
            }
            _ if self.tools.is_drawing() => {
                self.tools.continue_drawing(point);
                if let Some(start) = self.tools.start_point() {
                    let preview =
                        draw_shape(tool, start, point, &self.properties, modifiers.draw_options());
                    if preview.is_some() {
                        self.tools.set_preview(preview);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, screen_point: Point, modifiers: Modifiers) -> PointerUpOutcome {
        if self.pan_anchor.take().is_some() {
            return PointerUpOutcome::Nothing;
        }

        let point = self.camera.screen_to_scene(screen_point);
        let tool = self.tools.active_tool();
        match tool {
            ToolKind::Select => self.finish_drag(point),
            _ if tool.is_freehand() => {
                if self.tools.end_drawing(point).is_none() {
                    return PointerUpOutcome::Nothing;
                }
                let points = self.tools.take_path_points();
                match path_from_points(&points, &self.properties) {
                    Ok(element) => self.commit_element(element),
                    Err(EditorError::InsufficientInput { got, .. }) => {
                        debug!("Discarded freehand gesture with {got} point(s)");
                        PointerUpOutcome::Nothing
                    }
                    Err(e) => {
                        self.report(&e);
                        PointerUpOutcome::Nothing
                    }
                }
            }
            _ => {
                let Some((start, end)) = self.tools.end_drawing(point) else {
                    return PointerUpOutcome::Nothing;
                };
                match draw_shape(tool, start, end, &self.properties, modifiers.draw_options()) {
                    Some(element) => self.commit_element(element),
                    None => PointerUpOutcome::Nothing,
                }
            }
        }
    }

    fn finish_drag(&mut self, point: Point) -> PointerUpOutcome {
        self.drag_preview = None;
        let Some(frame_id) = self.active_frame else {
            return PointerUpOutcome::Nothing;
        };
        let elements = frame_elements(&self.store, Some(frame_id));
        let Some(commit) = self.selection.pointer_up(point, elements) else {
            return PointerUpOutcome::Nothing;
        };

        let moved: Vec<Element> = commit
            .elements
            .into_iter()
            .filter(|e| commit.moved_ids.contains(&e.id))
            .collect();
        if let Err(e) = self.store.replace_elements(frame_id, moved) {
            self.report(&e);
            return PointerUpOutcome::Nothing;
        }
        self.refresh_selection();
        PointerUpOutcome::Moved(commit.moved_ids)
    }

    /// Add a finished shape to the active frame and make it undoable.
    fn commit_element(&mut self, element: Element) -> PointerUpOutcome {
        let (Some(project_id), Some(scene_id), Some(frame_id)) =
            (self.active_project, self.active_scene, self.active_frame)
        else {
            return PointerUpOutcome::Nothing;
        };
        match self.store.add_element(frame_id, element) {
            Ok(id) => {
                self.undo
                    .record_element_added(project_id, scene_id, frame_id, id);
                PointerUpOutcome::Created(id)
            }
            Err(e) => {
                self.report(&e);
                PointerUpOutcome::Nothing
            }
        }
    }

    fn ensure_editable(&self, frame_id: FrameId) -> bool {
        let locked = self.store.get_frame(frame_id).is_some_and(|f| f.locked);
        if locked {
            warn!("Frame {frame_id} is locked");
            self.notifier.warning("This frame is locked");
        }
        !locked
    }

    fn erase_at(&mut self, frame_id: FrameId, point: Point) {
        let Some(hit_id) = hit_test(point, frame_elements(&self.store, Some(frame_id))).map(|e| e.id)
        else {
            return;
        };
        match self.store.remove_element(frame_id, hit_id) {
            Ok(_) => {
                self.undo.clear_for_element(hit_id);
                self.refresh_selection();
            }
            Err(e) => self.report(&e),
        }
    }

    /// Copy fill and stroke from the topmost element under the point.
    fn pick_style(&mut self, point: Point) {
        let elements = self.elements();
        let Some(style) = hit_test(point, elements)
            .and_then(|hit| elements.iter().find(|e| e.id == hit.id))
            .map(|e| e.style.clone())
        else {
            return;
        };
        if let Some(fill) = style.fill {
            self.properties.set_fill_color(fill);
        }
        if let Some(stroke) = style.stroke {
            self.properties.set_stroke_color(stroke);
        }
        if let Some(width) = style.stroke_width {
            self.properties.set_stroke_width(width);
        }
    }

    // --- commands ---

    pub fn select_all(&mut self) {
        let elements = frame_elements(&self.store, self.active_frame);
        self.selection.select_all(elements);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Remove the selected elements from the active frame.
    pub fn delete_selected(&mut self) -> usize {
        let Some(frame_id) = self.active_frame else {
            return 0;
        };
        let ids = self.selection.selected_ids().to_vec();
        if ids.is_empty() || !self.ensure_editable(frame_id) {
            return 0;
        }
        self.cancel_interaction();
        match self.store.remove_elements(frame_id, &ids) {
            Ok(removed) => {
                for id in &ids {
                    self.undo.clear_for_element(*id);
                }
                self.selection.clear();
                removed
            }
            Err(e) => {
                self.report(&e);
                0
            }
        }
    }

    /// Remove the most recently drawn element. Returns false when nothing
    /// was undone.
    pub fn undo(&mut self) -> bool {
        self.cancel_interaction();
        match self.undo.undo(&mut self.store) {
            Ok(_) => {
                self.refresh_selection();
                true
            }
            Err(EditorError::InvalidOperation(_)) => {
                self.notifier.info("Nothing to undo");
                false
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::SetTool(tool) => self.set_tool(tool),
            Command::Undo => {
                self.undo();
            }
            Command::DeleteSelected => {
                self.delete_selected();
            }
            Command::SelectAll => self.select_all(),
            Command::Escape => {
                self.cancel_interaction();
                self.selection.clear();
            }
            Command::ToggleFill => self.properties.toggle_fill(),
            Command::ResetColors => {
                self.properties.set_fill_color("#000000");
                self.properties.set_stroke_color("none");
            }
            Command::FillOpacity(opacity) => self.properties.set_fill_opacity(opacity),
            Command::StrokeWidthBy(step) => self
                .properties
                .set_stroke_width(self.properties.stroke_width + step),
        }
    }

    /// Resolve and run a key press. Returns true if a command ran.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers, text_input_focused: bool) -> bool {
        match self.keymap.resolve(key, modifiers, text_input_focused) {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    // --- view ---

    pub fn wheel(&mut self, screen_point: Point, delta_y: f64) {
        self.camera.wheel(screen_point, delta_y);
    }

    /// Fit the active project's canvas into the viewport.
    pub fn fit_to_screen(&mut self, viewport: Size) {
        let content = self
            .active_project
            .and_then(|id| self.store.get_project(id))
            .map(|p| p.dimensions.to_size())
            .unwrap_or(Size::ZERO);
        self.camera
            .fit_to_screen_with_margin(viewport, content, self.config.fit_margin);
    }

    fn refresh_selection(&mut self) {
        let elements = frame_elements(&self.store, self.active_frame);
        self.selection.refresh(elements);
    }

    fn report(&self, error: &EditorError) {
        warn!("{error}");
        self.notifier.error(&error.to_string());
    }
}

fn frame_elements(store: &SceneGraph, frame_id: Option<FrameId>) -> &[Element] {
    frame_id
        .and_then(|id| store.get_frame(id))
        .map(|f| f.elements.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FrameOptions, Geometry, ProjectOptions, SceneOptions};
    use crate::notify::{NotificationLevel, RecordingNotifier};

    fn canvas() -> Canvas<RecordingNotifier> {
        let mut store = SceneGraph::new();
        let project_id = store.create_project(ProjectOptions::default()).unwrap().id;
        let scene_id = store
            .create_scene(project_id, SceneOptions::default())
            .unwrap()
            .id;
        store
            .create_frame(scene_id, FrameOptions::default())
            .unwrap();
        let mut canvas = Canvas::with_notifier(store, RecordingNotifier::new());
        canvas.open_scene(project_id, scene_id).unwrap();
        canvas
    }

    fn drag(canvas: &mut Canvas<RecordingNotifier>, from: (f64, f64), to: (f64, f64)) -> PointerUpOutcome {
        canvas.pointer_down(Point::new(from.0, from.1), Modifiers::NONE);
        canvas.pointer_move(Point::new(to.0, to.1), Modifiers::NONE);
        canvas.pointer_up(Point::new(to.0, to.1), Modifiers::NONE)
    }

    #[test]
    fn test_draw_rectangle_records_undo() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        let outcome = drag(&mut canvas, (10.0, 10.0), (110.0, 60.0));
        assert!(matches!(outcome, PointerUpOutcome::Created(_)));
        assert_eq!(canvas.elements().len(), 1);
        assert!(canvas.undo_stack().can_undo());
        assert!(canvas.shape_preview().is_none());

        assert!(canvas.undo());
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn test_preview_during_gesture() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Ellipse);
        canvas.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        canvas.pointer_move(Point::new(40.0, 20.0), Modifiers::NONE);
        assert!(canvas.shape_preview().is_some());
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn test_single_point_freehand_discarded() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Pencil);
        canvas.pointer_down(Point::new(5.0, 5.0), Modifiers::NONE);
        let outcome = canvas.pointer_up(Point::new(5.0, 5.0), Modifiers::NONE);
        assert_eq!(outcome, PointerUpOutcome::Nothing);
        assert!(canvas.elements().is_empty());
        assert!(canvas.notifier().messages().is_empty());
    }

    #[test]
    fn test_freehand_stroke_creates_path() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Pen);
        canvas.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        canvas.pointer_move(Point::new(10.0, 5.0), Modifiers::NONE);
        canvas.pointer_move(Point::new(20.0, 0.0), Modifiers::NONE);
        let outcome = canvas.pointer_up(Point::new(20.0, 0.0), Modifiers::NONE);
        assert!(matches!(outcome, PointerUpOutcome::Created(_)));
        assert!(matches!(canvas.elements()[0].shape, Geometry::Path { .. }));
        assert!(canvas.tools().path_points().is_empty());
    }

    #[test]
    fn test_tool_switch_cancels_gesture() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        canvas.set_tool(ToolKind::Select);
        assert!(!canvas.tools().is_drawing());
        let outcome = canvas.pointer_up(Point::new(50.0, 50.0), Modifiers::NONE);
        assert_eq!(outcome, PointerUpOutcome::Nothing);
        assert!(canvas.elements().is_empty());
    }

    #[test]
    fn test_drag_moves_selection() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        canvas.set_tool(ToolKind::Select);

        let outcome = drag(&mut canvas, (10.0, 10.0), (40.0, 30.0));
        assert!(matches!(outcome, PointerUpOutcome::Moved(ref ids) if ids.len() == 1));
        match canvas.elements()[0].shape {
            Geometry::Rect { x, y, .. } => {
                assert!((x - 30.0).abs() < 1e-9);
                assert!((y - 20.0).abs() < 1e-9);
            }
            ref other => panic!("unexpected shape {other:?}"),
        }
        assert!(canvas.drag_preview().is_none());
    }

    #[test]
    fn test_frame_switch_abandons_drag() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        canvas.set_tool(ToolKind::Select);
        let scene_id = canvas.active_scene().unwrap();
        let second = canvas
            .store
            .create_frame(scene_id, FrameOptions::default())
            .unwrap()
            .id;
        let first = canvas.active_frame().unwrap();

        canvas.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
        canvas.pointer_move(Point::new(50.0, 50.0), Modifiers::NONE);
        canvas.set_active_frame(second).unwrap();
        canvas.pointer_up(Point::new(50.0, 50.0), Modifiers::NONE);

        let original = &canvas.store.get_frame(first).unwrap().elements[0];
        assert!(matches!(original.shape, Geometry::Rect { x, .. } if x.abs() < 1e-9));
    }

    #[test]
    fn test_delete_selected() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        drag(&mut canvas, (30.0, 30.0), (50.0, 50.0));
        assert!(canvas.handle_key("a", Modifiers::ctrl(), false));
        assert_eq!(canvas.selection().selected_ids().len(), 2);
        assert!(canvas.handle_key("Delete", Modifiers::NONE, false));
        assert!(canvas.elements().is_empty());
        assert!(!canvas.undo_stack().can_undo());
    }

    #[test]
    fn test_undo_empty_notifies() {
        let mut canvas = canvas();
        assert!(!canvas.undo());
        assert_eq!(
            canvas.notifier().last(),
            Some((NotificationLevel::Info, "Nothing to undo".to_string()))
        );
    }

    #[test]
    fn test_locked_frame_rejects_drawing() {
        let mut canvas = canvas();
        let frame_id = canvas.active_frame().unwrap();
        canvas
            .store
            .update_frame(
                frame_id,
                crate::model::FramePatch {
                    locked: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        assert!(canvas.elements().is_empty());
        assert_eq!(
            canvas.notifier().last().map(|(level, _)| level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_locked_frame_rejects_drag() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        let frame_id = canvas.active_frame().unwrap();
        canvas
            .store
            .update_frame(
                frame_id,
                crate::model::FramePatch {
                    locked: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let before = canvas.store.get_frame(frame_id).unwrap().clone();
        canvas.set_tool(ToolKind::Select);

        let outcome = drag(&mut canvas, (10.0, 10.0), (40.0, 30.0));
        assert_eq!(outcome, PointerUpOutcome::Nothing);
        assert!(canvas.drag_preview().is_none());
        let after = canvas.store.get_frame(frame_id).unwrap();
        assert_eq!(after.elements, before.elements);
        assert_eq!(after.updated_at, before.updated_at);
        // The click still selects
        assert_eq!(canvas.selection().selected_ids().len(), 1);
        assert_eq!(
            canvas.notifier().last(),
            Some((NotificationLevel::Warning, "This frame is locked".to_string()))
        );
    }

    #[test]
    fn test_eyedropper_picks_style() {
        let mut canvas = canvas();
        canvas.properties.set_fill_color("#ff8800");
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        canvas.properties.reset();

        canvas.set_tool(ToolKind::Eyedropper);
        canvas.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
        assert_eq!(canvas.properties.fill, "#ff8800");
    }

    #[test]
    fn test_eraser_removes_hit_element() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (0.0, 0.0), (20.0, 20.0));
        canvas.set_tool(ToolKind::Eraser);
        canvas.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
        canvas.pointer_up(Point::new(10.0, 10.0), Modifiers::NONE);
        assert!(canvas.elements().is_empty());
        assert!(!canvas.undo_stack().can_undo());
    }

    #[test]
    fn test_pan_tool_moves_camera() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Pan);
        drag(&mut canvas, (100.0, 100.0), (130.0, 90.0));
        assert!((canvas.camera.offset.x - 30.0).abs() < 1e-9);
        assert!((canvas.camera.offset.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawing_maps_through_camera() {
        let mut canvas = canvas();
        canvas.camera.zoom = 2.0;
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, (20.0, 20.0), (60.0, 40.0));
        match canvas.elements()[0].shape {
            Geometry::Rect { x, width, .. } => {
                assert!((x - 10.0).abs() < 1e-9);
                assert!((width - 20.0).abs() < 1e-9);
            }
            ref other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_no_active_frame_warns() {
        let mut canvas = canvas();
        canvas.leave_scene();
        canvas.set_tool(ToolKind::Line);
        canvas.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        assert!(!canvas.tools().is_drawing());
        assert_eq!(
            canvas.notifier().last().map(|(level, _)| level),
            Some(NotificationLevel::Warning)
        );
    }
}
