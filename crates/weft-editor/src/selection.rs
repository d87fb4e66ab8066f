//! Click-to-select resolution.
//!
//! A click lands on a whole ancestor chain of elements. Which one gets
//! selected depends on context: the first click on a stack picks the
//! outermost container so whole blocks move together, while follow-up
//! clicks (or a held modifier) reach the deepest element under the
//! pointer.

use weft_core::id::ElementId;

/// How to pick from the ancestor chain under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// The outermost element of the chain.
    Topmost,
    /// The innermost element of the chain.
    Deepest,
}

/// The policy for a click: a modifier always drills in, a first click on
/// an empty selection grabs the container, anything else drills in.
pub fn policy_for_click(modifier_held: bool, has_selection: bool) -> SelectionPolicy {
    if modifier_held || has_selection {
        SelectionPolicy::Deepest
    } else {
        SelectionPolicy::Topmost
    }
}

/// Pick from a hit chain ordered outermost → innermost.
pub fn resolve_click(chain: &[ElementId], policy: SelectionPolicy) -> Option<ElementId> {
    match policy {
        SelectionPolicy::Topmost => chain.first().copied(),
        SelectionPolicy::Deepest => chain.last().copied(),
    }
}
