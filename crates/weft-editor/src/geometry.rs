//! Canvas geometry: rectangles, containment tests, and the screen↔canvas
//! transform.
//!
//! Containment drives drop targeting, so the predicates here mirror what a
//! user sees: a dragged box nests only when every edge sits inside the
//! target, and leaves its parent only when the boxes stop touching at all.

use weft_core::model::CanvasPosition;

/// An axis-aligned box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    /// Full containment: all four edges of `self` sit inside `outer`.
    pub fn is_fully_inside(&self, outer: &Rect) -> bool {
        self.left() >= outer.left()
            && self.right() <= outer.right()
            && self.top() >= outer.top()
            && self.bottom() <= outer.bottom()
    }

    /// Complete separation: the boxes share no area at all. Touching edges
    /// still count as overlapping.
    pub fn is_completely_outside(&self, other: &Rect) -> bool {
        self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom()
    }
}

/// The viewport's zoom and pan. Pointer input arrives in screen pixels and
/// must be divided by `scale` before it is applied in canvas space — at 50%
/// zoom a 10px mouse move is a 20px canvas move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self { scale: 1.0, pan_x: 0.0, pan_y: 0.0 }
    }
}

impl CanvasTransform {
    pub fn screen_to_canvas(&self, x: f64, y: f64) -> CanvasPosition {
        CanvasPosition::new((x - self.pan_x) / self.scale, (y - self.pan_y) / self.scale)
    }

    pub fn screen_delta_to_canvas(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }
}
