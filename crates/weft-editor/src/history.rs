//! Undo/Redo history over forest snapshots.
//!
//! Tree mutations are pure (old forests stay valid), so history is plain
//! snapshot stacks: every committed edit pushes the pre-edit forest.
//! Gestures use **snapshot batching**: the forest is captured when the
//! gesture starts and compared when it ends, so a whole drag undoes in a
//! single step no matter how many intermediate updates it produced.

use weft_core::model::Element;

pub struct HistoryStack {
    undo_stack: Vec<Vec<Element>>,
    redo_stack: Vec<Vec<Element>>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Forest captured at the start of a batch.
    batch_snapshot: Option<Vec<Element>>,
}

impl HistoryStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
        }
    }

    /// Record an edit: `before` is the forest as it was just before the
    /// mutation. Inside a batch this is a no-op — the gesture's starting
    /// snapshot already covers it.
    pub fn record(&mut self, before: &[Element]) {
        if self.batch_depth > 0 {
            return;
        }
        self.push_undo(before.to_vec());
        self.redo_stack.clear();
    }

    /// Start a gesture batch, capturing the current forest.
    pub fn begin_batch(&mut self, current: &[Element]) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(current.to_vec());
        }
        self.batch_depth += 1;
    }

    /// End a gesture batch. When the outermost batch closes and the forest
    /// actually changed, the starting snapshot becomes one undo step.
    pub fn end_batch(&mut self, current: &[Element]) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            if let Some(snapshot) = self.batch_snapshot.take()
                && snapshot != current
            {
                self.push_undo(snapshot);
                self.redo_stack.clear();
            }
        }
    }

    /// Undo: returns the forest to restore, given the current one.
    pub fn undo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        let restored = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        Some(restored)
    }

    /// Redo: returns the forest to restore, given the current one.
    pub fn redo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push_undo(&mut self, snapshot: Vec<Element>) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }
}
