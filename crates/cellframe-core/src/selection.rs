//! Selection, hit-testing and drag translation.

use crate::geometry::{
    element_bounds, normalize_rect, point_in_rect, rect_intersects, selection_bounds,
};
use crate::model::{Element, ElementId, FrameId, Geometry};
use crate::path::{PathData, PointList};
use crate::signal::{Observable, SubscriptionId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the selection overlay is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    #[default]
    Idle,
    Move,
    Scale,
    Rotate,
    BoxSelect,
}

/// Observable selection for the active frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Selected ids, without duplicates.
    pub selected_ids: Vec<ElementId>,
    /// Union of the selected elements' bounds.
    pub bounds: Option<Rect>,
    pub mode: SelectionMode,
    pub dragging: bool,
}

impl SelectionState {
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
    }
}

/// Topmost element under a point together with its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub id: ElementId,
    pub bounds: Rect,
}

/// Find the topmost selectable element whose bounds contain `point`.
pub fn hit_test(point: Point, elements: &[Element]) -> Option<HitResult> {
    elements
        .iter()
        .rev()
        .filter(|e| e.is_selectable())
        .find_map(|e| {
            element_bounds(e)
                .filter(|b| point_in_rect(point, *b))
                .map(|bounds| HitResult { id: e.id, bounds })
        })
}

/// Ids of selectable elements whose bounds intersect `rect`, in paint order.
pub fn elements_in_rect(rect: Rect, elements: &[Element]) -> Vec<ElementId> {
    elements
        .iter()
        .filter(|e| e.is_selectable())
        .filter(|e| element_bounds(e).is_some_and(|b| rect_intersects(rect, b)))
        .map(|e| e.id)
        .collect()
}

/// Geometry parsed once at drag start so moves never re-tokenize.
#[derive(Debug, Clone)]
enum ParsedGeometry {
    Path(PathData),
    Points(PointList),
    Plain,
    /// Unparseable geometry; the element stays where it is.
    Malformed,
}

impl ParsedGeometry {
    fn of(element: &Element) -> Self {
        let parsed = match &element.shape {
            Geometry::Path { d } => PathData::parse(d).map(ParsedGeometry::Path),
            Geometry::Polygon { points } | Geometry::Polyline { points } => {
                PointList::parse(points).map(ParsedGeometry::Points)
            }
            _ => Ok(ParsedGeometry::Plain),
        };
        parsed.unwrap_or_else(|err| {
            log::debug!("Element {} will not move: {err}", element.id);
            ParsedGeometry::Malformed
        })
    }
}

/// Snapshot of one element taken at drag start.
#[derive(Debug, Clone)]
struct DragOriginal {
    element: Element,
    parsed: ParsedGeometry,
}

impl DragOriginal {
    /// The snapshot shifted by `delta`.
    fn translated(&self, delta: Vec2) -> Element {
        let mut element = self.element.clone();
        match (&self.parsed, &mut element.shape) {
            (ParsedGeometry::Path(data), Geometry::Path { d }) => {
                *d = data.translated(delta.x, delta.y).to_string();
            }
            (ParsedGeometry::Points(list), Geometry::Polygon { points })
            | (ParsedGeometry::Points(list), Geometry::Polyline { points }) => {
                *points = list.translated(delta.x, delta.y).to_string();
            }
            (ParsedGeometry::Plain, shape) => {
                if let Ok(moved) = shape.translated(delta.x, delta.y) {
                    *shape = moved;
                }
            }
            _ => {}
        }
        element
    }
}

/// State for moving the selected elements.
///
/// Every move re-derives positions from the snapshot taken at drag start, so
/// the number of intermediate events never affects the result.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub start_point: Point,
    pub current_point: Point,
    originals: Vec<DragOriginal>,
}

impl DragSession {
    pub fn new<'a>(start_point: Point, elements: impl IntoIterator<Item = &'a Element>) -> Self {
        let originals = elements
            .into_iter()
            .map(|e| DragOriginal {
                parsed: ParsedGeometry::of(e),
                element: e.clone(),
            })
            .collect();
        Self {
            start_point,
            current_point: start_point,
            originals,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    pub fn element_ids(&self) -> Vec<ElementId> {
        self.originals.iter().map(|o| o.element.id).collect()
    }

    /// Ids of the dragged elements whose geometry actually changes at the
    /// current delta. Malformed elements never appear here.
    pub fn moved_ids(&self) -> Vec<ElementId> {
        let delta = self.delta();
        self.originals
            .iter()
            .filter(|o| o.translated(delta).shape != o.element.shape)
            .map(|o| o.element.id)
            .collect()
    }

    pub fn update(&mut self, point: Point) {
        self.current_point = point;
    }

    /// Snapshot elements translated by the current delta.
    pub fn moved_elements(&self) -> Vec<Element> {
        let delta = self.delta();
        self.originals.iter().map(|o| o.translated(delta)).collect()
    }

    /// Replace the dragged elements inside a full element list, keeping paint order.
    pub fn apply_to(&self, elements: &[Element]) -> Vec<Element> {
        let moved: HashMap<ElementId, Element> = self
            .moved_elements()
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        elements
            .iter()
            .map(|e| moved.get(&e.id).cloned().unwrap_or_else(|| e.clone()))
            .collect()
    }
}

/// Rubber-band selection in progress.
#[derive(Debug, Clone)]
pub struct BoxSelect {
    pub start_point: Point,
    pub current_point: Point,
    /// Selection kept underneath the box (non-empty only for additive boxes).
    base: Vec<ElementId>,
}

impl BoxSelect {
    pub fn rect(&self) -> Rect {
        normalize_rect(self.start_point, self.current_point)
    }

    /// Base selection plus everything the box touches.
    fn selection(&self, elements: &[Element]) -> Vec<ElementId> {
        let mut ids = self.base.clone();
        for id in elements_in_rect(self.rect(), elements) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Default)]
enum Interaction {
    #[default]
    None,
    Drag(DragSession),
    Box(BoxSelect),
}

/// What a pointer-down did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDownAction {
    /// Additive click toggled one element.
    Toggled(ElementId),
    /// A move drag started on the selection.
    DragStarted,
    /// Box selection started on empty canvas.
    BoxStarted,
}

/// Result of releasing a drag: the frame's elements with the move applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub elements: Vec<Element>,
    pub moved_ids: Vec<ElementId>,
    pub delta: Vec2,
}

/// Selection engine for the active frame, with a per-frame selection cache.
#[derive(Debug, Default)]
pub struct SelectionManager {
    state: Observable<SelectionState>,
    active_frame: Option<FrameId>,
    frame_cache: HashMap<FrameId, Vec<ElementId>>,
    interaction: Interaction,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        self.state.get()
    }

    pub fn selected_ids(&self) -> &[ElementId] {
        &self.state.get().selected_ids
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.state.get().bounds
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.state.get().is_selected(id)
    }

    pub fn active_frame(&self) -> Option<FrameId> {
        self.active_frame
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SelectionState) + 'static) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Switch frames: cache the outgoing selection, restore the incoming
    /// frame's cached selection and abandon any drag or box in progress.
    pub fn set_active_frame(&mut self, frame_id: FrameId, elements: &[Element]) {
        if self.active_frame == Some(frame_id) {
            return;
        }
        self.cancel_interaction();
        if let Some(previous) = self.active_frame {
            self.frame_cache
                .insert(previous, self.state.get().selected_ids.clone());
        }
        self.active_frame = Some(frame_id);

        let restored: Vec<ElementId> = self
            .frame_cache
            .get(&frame_id)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| elements.iter().any(|e| e.id == *id))
                    .collect()
            })
            .unwrap_or_default();
        let bounds = bounds_of(&restored, elements);
        self.state.set(SelectionState {
            selected_ids: restored,
            bounds,
            mode: SelectionMode::Idle,
            dragging: false,
        });
    }

    /// Forget the active frame and every cached selection.
    pub fn reset(&mut self) {
        self.cancel_interaction();
        self.active_frame = None;
        self.frame_cache.clear();
        self.state.set(SelectionState::default());
    }

    /// Replace the selection (duplicates dropped).
    pub fn set_selection(&mut self, ids: &[ElementId], elements: &[Element]) {
        let mut unique: Vec<ElementId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        let bounds = bounds_of(&unique, elements);
        if let Some(frame) = self.active_frame {
            self.frame_cache.insert(frame, unique.clone());
        }
        self.state.update(|s| {
            s.selected_ids = unique;
            s.bounds = bounds;
        });
    }

    /// Add or remove one element.
    pub fn toggle(&mut self, id: ElementId, elements: &[Element]) {
        let mut ids = self.state.get().selected_ids.clone();
        if let Some(pos) = ids.iter().position(|x| *x == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        self.set_selection(&ids, elements);
    }

    pub fn select_all(&mut self, elements: &[Element]) {
        let ids: Vec<ElementId> = elements
            .iter()
            .filter(|e| e.is_selectable())
            .map(|e| e.id)
            .collect();
        self.set_selection(&ids, elements);
    }

    pub fn clear(&mut self) {
        self.set_selection(&[], &[]);
    }

    /// Recompute bounds after the elements changed, dropping ids that no longer exist.
    pub fn refresh(&mut self, elements: &[Element]) {
        let ids: Vec<ElementId> = self
            .state
            .get()
            .selected_ids
            .iter()
            .copied()
            .filter(|id| elements.iter().any(|e| e.id == *id))
            .collect();
        self.set_selection(&ids, elements);
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.state.update(|s| s.mode = mode);
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.state.update(|s| s.bounds = bounds);
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.state.update(|s| s.dragging = dragging);
    }

    /// Drag in progress, if any.
    pub fn drag(&self) -> Option<&DragSession> {
        match &self.interaction {
            Interaction::Drag(drag) => Some(drag),
            _ => None,
        }
    }

    /// Box selection in progress, if any.
    pub fn box_select(&self) -> Option<&BoxSelect> {
        match &self.interaction {
            Interaction::Box(b) => Some(b),
            _ => None,
        }
    }

    /// Pointer pressed with the select tool.
    pub fn pointer_down(
        &mut self,
        point: Point,
        additive: bool,
        elements: &[Element],
    ) -> PointerDownAction {
        self.cancel_interaction();

        match hit_test(point, elements) {
            Some(hit) if additive => {
                self.toggle(hit.id, elements);
                PointerDownAction::Toggled(hit.id)
            }
            Some(hit) => {
                if !self.is_selected(hit.id) {
                    self.set_selection(&[hit.id], elements);
                }
                let selected = self.state.get().selected_ids.clone();
                let session = DragSession::new(
                    point,
                    elements.iter().filter(|e| selected.contains(&e.id)),
                );
                log::debug!("Drag started on {} element(s)", selected.len());
                self.interaction = Interaction::Drag(session);
                self.state.update(|s| {
                    s.mode = SelectionMode::Move;
                    s.dragging = true;
                });
                PointerDownAction::DragStarted
            }
            None => {
                if !additive {
                    self.clear();
                }
                self.interaction = Interaction::Box(BoxSelect {
                    start_point: point,
                    current_point: point,
                    base: self.state.get().selected_ids.clone(),
                });
                self.set_mode(SelectionMode::BoxSelect);
                PointerDownAction::BoxStarted
            }
        }
    }

    /// Pointer moved. Returns the dragged elements at their preview positions
    /// while a drag is active.
    pub fn pointer_move(&mut self, point: Point, elements: &[Element]) -> Option<Vec<Element>> {
        match &mut self.interaction {
            Interaction::Drag(drag) => {
                drag.update(point);
                let moved = drag.moved_elements();
                let bounds = selection_bounds(&moved);
                self.set_bounds(bounds);
                Some(moved)
            }
            Interaction::Box(b) => {
                b.current_point = point;
                let ids = b.selection(elements);
                self.set_selection(&ids, elements);
                None
            }
            Interaction::None => None,
        }
    }

    /// Pointer released. A drag that actually moved yields a single commit.
    pub fn pointer_up(&mut self, point: Point, elements: &[Element]) -> Option<DragCommit> {
        match std::mem::take(&mut self.interaction) {
            Interaction::Drag(mut drag) => {
                drag.update(point);
                self.state.update(|s| {
                    s.mode = SelectionMode::Idle;
                    s.dragging = false;
                });
                let delta = drag.delta();
                let moved_ids = drag.moved_ids();
                if delta == Vec2::ZERO || moved_ids.is_empty() {
                    return None;
                }
                let updated = drag.apply_to(elements);
                let bounds = bounds_of(self.selected_ids(), &updated);
                self.set_bounds(bounds);
                log::debug!("Drag finished with delta ({}, {})", delta.x, delta.y);
                Some(DragCommit {
                    elements: updated,
                    moved_ids,
                    delta,
                })
            }
            Interaction::Box(mut b) => {
                b.current_point = point;
                let ids = b.selection(elements);
                self.set_selection(&ids, elements);
                self.set_mode(SelectionMode::Idle);
                None
            }
            Interaction::None => None,
        }
    }

    /// Abandon any drag or box in progress without committing it.
    pub fn cancel_interaction(&mut self) {
        let had_drag = match std::mem::take(&mut self.interaction) {
            Interaction::None => return,
            Interaction::Drag(drag) => {
                // Bounds go back to the snapshot positions
                let originals: Vec<Element> =
                    drag.originals.into_iter().map(|o| o.element).collect();
                self.set_bounds(selection_bounds(&originals));
                true
            }
            Interaction::Box(_) => false,
        };
        if had_drag {
            log::debug!("Drag cancelled");
        }
        self.state.update(|s| {
            s.mode = SelectionMode::Idle;
            s.dragging = false;
        });
    }

    pub fn is_interacting(&self) -> bool {
        !matches!(self.interaction, Interaction::None)
    }
}

fn bounds_of(ids: &[ElementId], elements: &[Element]) -> Option<Rect> {
    selection_bounds(elements.iter().filter(|e| ids.contains(&e.id)))
}
