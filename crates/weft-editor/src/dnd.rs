//! Containment-driven drop logic.
//!
//! While a drag is live the caller feeds in the measured boxes of every
//! element; at drop time the projected box of the dragged element decides
//! what happens, in strict priority order: nest into a qualifying new
//! parent, detach from the current parent, move as a root, or nothing.

use crate::geometry::Rect;
use std::collections::HashMap;
use weft_core::id::ElementId;
use weft_core::model::{CanvasPosition, Element};
use weft_core::tree;

/// Measured element boxes in canvas coordinates, fed per frame by whatever
/// renders the canvas.
pub type RectIndex = HashMap<ElementId, Rect>;

/// What a drop does, in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropDecision {
    /// The dragged box landed fully inside a new parent: nest inside it.
    Nest { parent: ElementId },
    /// The dragged box left its parent entirely: become a root here.
    Detach { position: CanvasPosition },
    /// A root that landed nowhere special: move by the drag delta.
    MoveRoot { position: CanvasPosition },
    /// A nested element that neither nested nor detached: snap back.
    None,
}

/// The new parent the dragged element would nest into, if any: an element
/// with a children slot, outside the dragged subtree, that fully contains
/// the projected box. When several qualify the smallest box wins — the
/// deepest visual container the user dropped into.
pub fn potential_parent(
    elements: &[Element],
    rects: &RectIndex,
    id: ElementId,
    delta: (f64, f64),
) -> Option<ElementId> {
    let projected = rects.get(&id)?.translate(delta.0, delta.1);
    let current_parent = tree::find_parent_id(elements, id);

    let mut best: Option<(ElementId, f64)> = None;
    for candidate_id in tree::collect_ids(elements) {
        if candidate_id == id
            || Some(candidate_id) == current_parent
            || tree::is_descendant(elements, id, candidate_id)
        {
            continue;
        }
        let Some(candidate) = tree::find(elements, candidate_id) else {
            continue;
        };
        if candidate.is_text() || candidate.children.is_none() {
            continue;
        }
        let Some(rect) = rects.get(&candidate_id) else {
            continue;
        };
        if projected.is_fully_inside(rect) {
            let area = rect.area();
            if best.is_none_or(|(_, best_area)| area < best_area) {
                best = Some((candidate_id, area));
            }
        }
    }
    best.map(|(id, _)| id)
}

/// Whether the projected box has left the current parent entirely.
/// Roots have no parent to leave.
pub fn should_detach(
    elements: &[Element],
    rects: &RectIndex,
    id: ElementId,
    delta: (f64, f64),
) -> bool {
    let Some(parent) = tree::find_parent_id(elements, id) else {
        return false;
    };
    let (Some(dragged), Some(parent_rect)) = (rects.get(&id), rects.get(&parent)) else {
        return false;
    };
    dragged.translate(delta.0, delta.1).is_completely_outside(parent_rect)
}

/// Resolve a drop. A new parent always wins over detaching — when a nested
/// element leaves its parent and lands inside a sibling in one gesture, it
/// nests there instead of floating free.
pub fn decide_drop(
    elements: &[Element],
    rects: &RectIndex,
    id: ElementId,
    delta: (f64, f64),
) -> DropDecision {
    if let Some(parent) = potential_parent(elements, rects, id, delta) {
        return DropDecision::Nest { parent };
    }
    if should_detach(elements, rects, id, delta) {
        if let Some(rect) = rects.get(&id) {
            let projected = rect.translate(delta.0, delta.1);
            return DropDecision::Detach {
                position: CanvasPosition::new(projected.x, projected.y),
            };
        }
    }
    if let Some(el) = tree::find(elements, id)
        && let Some(pos) = el.canvas_position
    {
        return DropDecision::MoveRoot {
            position: CanvasPosition::new(pos.x + delta.0, pos.y + delta.1),
        };
    }
    DropDecision::None
}

/// Apply a drop decision to the forest.
pub fn commit_drop(elements: &[Element], id: ElementId, decision: DropDecision) -> Vec<Element> {
    match decision {
        DropDecision::Nest { parent } => tree::reparent(elements, id, parent),
        DropDecision::Detach { position } => tree::detach_to_root(elements, id, position),
        DropDecision::MoveRoot { position } => tree::update_canvas_position(elements, id, position),
        DropDecision::None => elements.to_vec(),
    }
}
