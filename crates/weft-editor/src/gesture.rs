//! Transient pointer gestures: dragging roots across the canvas and
//! resizing via the eight selection handles.
//!
//! Gesture state is captured once at pointer-down (screen position plus
//! the element's starting box) and every update is derived from the
//! current pointer — intermediate updates never accumulate error.

use crate::geometry::CanvasTransform;
use weft_core::id::ElementId;
use weft_core::model::CanvasPosition;

/// Elements never resize below this box.
pub const MIN_WIDTH: f64 = 50.0;
pub const MIN_HEIGHT: f64 = 30.0;

// ─── Dragging ───────────────────────────────────────────────────────────

/// A root element being dragged across the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub id: ElementId,
    /// Pointer-down position, screen pixels.
    pub start_x: f64,
    pub start_y: f64,
    /// The element's canvas position at pointer-down.
    pub start_left: f64,
    pub start_top: f64,
}

impl DragState {
    pub fn begin(id: ElementId, start: CanvasPosition, pointer_x: f64, pointer_y: f64) -> Self {
        Self {
            id,
            start_x: pointer_x,
            start_y: pointer_y,
            start_left: start.x,
            start_top: start.y,
        }
    }

    /// Position for the current pointer: the screen delta scaled into
    /// canvas space and applied to the starting position.
    pub fn position_at(
        &self,
        pointer_x: f64,
        pointer_y: f64,
        transform: &CanvasTransform,
    ) -> CanvasPosition {
        let (dx, dy) =
            transform.screen_delta_to_canvas(pointer_x - self.start_x, pointer_y - self.start_y);
        CanvasPosition::new(self.start_left + dx, self.start_top + dy)
    }

    /// Canvas-space delta for the current pointer.
    pub fn delta_at(&self, pointer_x: f64, pointer_y: f64, transform: &CanvasTransform) -> (f64, f64) {
        transform.screen_delta_to_canvas(pointer_x - self.start_x, pointer_y - self.start_y)
    }
}

// ─── Resizing ───────────────────────────────────────────────────────────

/// The eight resize handles around a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl ResizeHandle {
    pub fn has_north(&self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    pub fn has_south(&self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }

    pub fn has_east(&self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    pub fn has_west(&self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }
}

/// An element being resized by one handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeState {
    pub id: ElementId,
    pub handle: ResizeHandle,
    pub start_x: f64,
    pub start_y: f64,
    pub start_width: f64,
    pub start_height: f64,
    pub start_left: f64,
    pub start_top: f64,
}

/// The box a resize update produces. `x`/`y` only matter for roots; nested
/// elements keep flowing in their parent and just change size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeUpdate {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ResizeState {
    /// Compute the box for the current pointer. West and north handles move
    /// the origin so the opposite edge stays pinned; the minimum size wins
    /// over the pointer, and the pinned edge stays pinned even when the
    /// clamp engages.
    pub fn update_at(
        &self,
        pointer_x: f64,
        pointer_y: f64,
        transform: &CanvasTransform,
    ) -> ResizeUpdate {
        let (dx, dy) =
            transform.screen_delta_to_canvas(pointer_x - self.start_x, pointer_y - self.start_y);

        let mut width = self.start_width;
        let mut height = self.start_height;
        let mut x = self.start_left;
        let mut y = self.start_top;

        if self.handle.has_east() {
            width = (self.start_width + dx).max(MIN_WIDTH);
        } else if self.handle.has_west() {
            width = (self.start_width - dx).max(MIN_WIDTH);
            x = self.start_left + (self.start_width - width);
        }

        if self.handle.has_south() {
            height = (self.start_height + dy).max(MIN_HEIGHT);
        } else if self.handle.has_north() {
            height = (self.start_height - dy).max(MIN_HEIGHT);
            y = self.start_top + (self.start_height - height);
        }

        ResizeUpdate { x, y, width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(handle: ResizeHandle) -> ResizeState {
        ResizeState {
            id: ElementId::fresh(),
            handle,
            start_x: 0.0,
            start_y: 0.0,
            start_width: 200.0,
            start_height: 100.0,
            start_left: 40.0,
            start_top: 20.0,
        }
    }

    fn t() -> CanvasTransform {
        CanvasTransform::default()
    }

    #[test]
    fn east_handle_grows_width_only() {
        let u = state(ResizeHandle::E).update_at(30.0, 99.0, &t());
        assert_eq!(u.width, 230.0);
        assert_eq!(u.height, 100.0);
        assert_eq!((u.x, u.y), (40.0, 20.0));
    }

    #[test]
    fn west_handle_pins_right_edge() {
        let u = state(ResizeHandle::W).update_at(30.0, 0.0, &t());
        assert_eq!(u.width, 170.0);
        assert_eq!(u.x, 70.0);
        // Right edge unchanged
        assert_eq!(u.x + u.width, 240.0);
    }

    #[test]
    fn clamp_keeps_opposite_edge_pinned() {
        // Drag the west handle far past the right edge
        let u = state(ResizeHandle::W).update_at(500.0, 0.0, &t());
        assert_eq!(u.width, MIN_WIDTH);
        assert_eq!(u.x + u.width, 240.0);

        let u = state(ResizeHandle::N).update_at(0.0, 500.0, &t());
        assert_eq!(u.height, MIN_HEIGHT);
        assert_eq!(u.y + u.height, 120.0);
    }

    #[test]
    fn corner_handle_changes_both_axes() {
        let u = state(ResizeHandle::Se).update_at(10.0, 10.0, &t());
        assert_eq!(u.width, 210.0);
        assert_eq!(u.height, 110.0);
    }

    #[test]
    fn resize_deltas_divide_by_zoom() {
        let zoomed = CanvasTransform { scale: 0.5, ..Default::default() };
        let u = state(ResizeHandle::E).update_at(10.0, 0.0, &zoomed);
        // 10 screen px at 50% zoom is 20 canvas px
        assert_eq!(u.width, 220.0);
    }

    #[test]
    fn drag_position_tracks_pointer() {
        let drag = DragState::begin(ElementId::fresh(), CanvasPosition::new(100.0, 100.0), 5.0, 5.0);
        let pos = drag.position_at(25.0, 15.0, &t());
        assert_eq!((pos.x, pos.y), (120.0, 110.0));

        let zoomed = CanvasTransform { scale: 2.0, ..Default::default() };
        let pos = drag.position_at(25.0, 15.0, &zoomed);
        assert_eq!((pos.x, pos.y), (110.0, 105.0));
    }
}
