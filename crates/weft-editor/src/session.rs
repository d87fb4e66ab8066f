//! The editor session: one open canvas document being edited.
//!
//! Holds the forest, the selection, the viewport transform, and any live
//! gesture, and turns pointer-level input into pure tree mutations with
//! history recording. Rendering and persistence live elsewhere — the
//! session only owns state that must survive between input events.

use crate::dnd::{self, DropDecision, RectIndex};
use crate::geometry::CanvasTransform;
use crate::gesture::{DragState, ResizeHandle, ResizeState};
use crate::history::HistoryStack;
use crate::selection::{self, SelectionPolicy};
use weft_core::id::ElementId;
use weft_core::model::{Element, PropValue};
use weft_core::tree::{self, InsertPosition};

const HISTORY_DEPTH: usize = 100;

pub struct EditorSession {
    elements: Vec<Element>,
    pub selected: Option<ElementId>,
    pub hovered: Option<ElementId>,
    pub transform: CanvasTransform,
    drag: Option<DragState>,
    resize: Option<ResizeState>,
    history: HistoryStack,
}

impl EditorSession {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            selected: None,
            hovered: None,
            transform: CanvasTransform::default(),
            drag: None,
            resize: None,
            history: HistoryStack::new(HISTORY_DEPTH),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Replace the forest as one undoable edit.
    pub fn apply(&mut self, next: Vec<Element>) {
        if next != self.elements {
            self.history.record(&self.elements);
            self.elements = next;
        }
    }

    // ─── Selection ──────────────────────────────────────────────────────

    /// Resolve a click on a hit chain (outermost → innermost).
    pub fn click(&mut self, chain: &[ElementId], modifier_held: bool) {
        let policy = selection::policy_for_click(modifier_held, self.selected.is_some());
        self.selected = selection::resolve_click(chain, policy);
    }

    pub fn selection_policy(&self, modifier_held: bool) -> SelectionPolicy {
        selection::policy_for_click(modifier_held, self.selected.is_some())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ─── Dragging ───────────────────────────────────────────────────────

    /// Start dragging an element at a pointer-down. Nested elements start
    /// from a zero position — only the drop decision cares about their box.
    pub fn begin_drag(&mut self, id: ElementId, pointer_x: f64, pointer_y: f64) {
        let Some(el) = tree::find(&self.elements, id) else {
            return;
        };
        let start = el.canvas_position.unwrap_or_default();
        self.history.begin_batch(&self.elements);
        self.drag = Some(DragState::begin(id, start, pointer_x, pointer_y));
    }

    /// Live drag update: move roots under the pointer. If the element
    /// vanished from the forest mid-gesture (a concurrent edit), the drag
    /// is silently discarded.
    pub fn update_drag(&mut self, pointer_x: f64, pointer_y: f64) {
        let Some(drag) = self.drag else { return };
        if tree::find(&self.elements, drag.id).is_none() {
            self.cancel_drag();
            return;
        }
        if tree::find_parent_id(&self.elements, drag.id).is_none() {
            let pos = drag.position_at(pointer_x, pointer_y, &self.transform);
            self.elements = tree::update_canvas_position(&self.elements, drag.id, pos);
        }
    }

    /// Drop: resolve against the measured boxes and commit.
    pub fn end_drag(&mut self, rects: &RectIndex, pointer_x: f64, pointer_y: f64) -> DropDecision {
        let Some(drag) = self.drag.take() else {
            return DropDecision::None;
        };
        if tree::find(&self.elements, drag.id).is_none() {
            self.history.end_batch(&self.elements);
            return DropDecision::None;
        }
        let delta = drag.delta_at(pointer_x, pointer_y, &self.transform);
        let decision = match dnd::decide_drop(&self.elements, rects, drag.id, delta) {
            // Roots already moved live during the drag; recompute from the
            // gesture start so the delta is not applied twice.
            DropDecision::MoveRoot { .. } => DropDecision::MoveRoot {
                position: drag.position_at(pointer_x, pointer_y, &self.transform),
            },
            other => other,
        };
        self.elements = dnd::commit_drop(&self.elements, drag.id, decision);
        self.history.end_batch(&self.elements);
        decision
    }

    /// Abandon the gesture without committing anything.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
        self.history.end_batch(&self.elements);
    }

    pub fn dragging(&self) -> Option<ElementId> {
        self.drag.map(|d| d.id)
    }

    // ─── Resizing ───────────────────────────────────────────────────────

    pub fn begin_resize(
        &mut self,
        id: ElementId,
        handle: ResizeHandle,
        start_box: crate::geometry::Rect,
        pointer_x: f64,
        pointer_y: f64,
    ) {
        if tree::find(&self.elements, id).is_none() {
            return;
        }
        self.history.begin_batch(&self.elements);
        self.resize = Some(ResizeState {
            id,
            handle,
            start_x: pointer_x,
            start_y: pointer_y,
            start_width: start_box.width,
            start_height: start_box.height,
            start_left: start_box.x,
            start_top: start_box.y,
        });
    }

    /// Live resize: explicit width/height styles, and for roots a canvas
    /// position so the opposite edge stays pinned.
    pub fn update_resize(&mut self, pointer_x: f64, pointer_y: f64) {
        let Some(resize) = self.resize else { return };
        if tree::find(&self.elements, resize.id).is_none() {
            self.cancel_resize();
            return;
        }
        let update = resize.update_at(pointer_x, pointer_y, &self.transform);
        let is_root = tree::find_parent_id(&self.elements, resize.id).is_none();
        self.elements = tree::update(&self.elements, resize.id, |el| {
            el.styles.insert("width", update.width);
            el.styles.insert("height", update.height);
            if is_root && el.canvas_position.is_some() {
                el.canvas_position = Some(weft_core::model::CanvasPosition::new(update.x, update.y));
            }
        });
    }

    pub fn end_resize(&mut self) {
        self.resize = None;
        self.history.end_batch(&self.elements);
    }

    pub fn cancel_resize(&mut self) {
        self.resize = None;
        self.history.end_batch(&self.elements);
    }

    // ─── Edits ──────────────────────────────────────────────────────────

    /// Add a palette element as a new canvas root.
    pub fn insert_root(&mut self, element: Element) {
        self.history.record(&self.elements);
        self.elements.push(element);
    }

    pub fn insert_at(&mut self, element: Element, position: InsertPosition) {
        let next = tree::insert(&self.elements, element, position);
        self.apply(next);
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selected else { return };
        let (next, removed) = tree::remove(&self.elements, id);
        if removed.is_some() {
            self.history.record(&self.elements);
            self.elements = next;
        }
        self.selected = None;
    }

    pub fn set_style(&mut self, id: ElementId, key: &str, value: PropValue) {
        let next = tree::set_style(&self.elements, id, key, value);
        self.apply(next);
    }

    pub fn set_prop(&mut self, id: ElementId, key: &str, value: PropValue) {
        let next = tree::update(&self.elements, id, |el| el.props.insert(key, value));
        self.apply(next);
    }

    /// Replace a text leaf's content.
    pub fn set_text(&mut self, id: ElementId, text: &str) {
        let next = tree::set_text(&self.elements, id, text);
        self.apply(next);
    }

    // ─── History ────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.elements) {
            Some(restored) => {
                self.elements = restored;
                self.prune_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.elements) {
            Some(restored) => {
                self.elements = restored;
                self.prune_selection();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Selection may point at an element that no longer exists after a
    /// history jump.
    fn prune_selection(&mut self) {
        if let Some(id) = self.selected
            && tree::find(&self.elements, id).is_none()
        {
            self.selected = None;
        }
        if let Some(id) = self.hovered
            && tree::find(&self.elements, id).is_none()
        {
            self.hovered = None;
        }
    }
}
