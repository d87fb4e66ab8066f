//! Pure query and mutation utilities over the element forest.
//!
//! Every mutation takes the forest by reference and returns a new forest,
//! leaving the input untouched — the editor's history stack depends on
//! old snapshots staying valid. All operations are total: a missing id or
//! an invalid target returns the forest unchanged, never an error.

use crate::id::ElementId;
use crate::model::{CanvasPosition, Element};

/// Where to insert an element relative to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// As the previous sibling of the target.
    Before(ElementId),
    /// As the next sibling of the target.
    After(ElementId),
    /// Appended to the target's children.
    Inside(ElementId),
}

/// Depth-first search for an element by id.
pub fn find(elements: &[Element], id: ElementId) -> Option<&Element> {
    for el in elements {
        if el.id == id {
            return Some(el);
        }
        if let Some(found) = find(el.child_slice(), id) {
            return Some(found);
        }
    }
    None
}

/// The id of the element's direct parent. `None` for roots and unknown ids.
pub fn find_parent_id(elements: &[Element], id: ElementId) -> Option<ElementId> {
    for el in elements {
        if el.child_slice().iter().any(|c| c.id == id) {
            return Some(el.id);
        }
        if let Some(parent) = find_parent_id(el.child_slice(), id) {
            return Some(parent);
        }
    }
    None
}

/// Whether `id` sits anywhere in the subtree rooted at `ancestor`
/// (excluding `ancestor` itself).
pub fn is_descendant(elements: &[Element], ancestor: ElementId, id: ElementId) -> bool {
    match find(elements, ancestor) {
        Some(root) => find(root.child_slice(), id).is_some(),
        None => false,
    }
}

/// Every id in the forest, in document order.
pub fn collect_ids(elements: &[Element]) -> Vec<ElementId> {
    let mut ids = Vec::new();
    fn walk(elements: &[Element], ids: &mut Vec<ElementId>) {
        for el in elements {
            ids.push(el.id);
            walk(el.child_slice(), ids);
        }
    }
    walk(elements, &mut ids);
    ids
}

/// Remove an element (with its whole subtree) wherever it sits.
/// Returns the new forest and the removed subtree, if the id existed.
pub fn remove(elements: &[Element], id: ElementId) -> (Vec<Element>, Option<Element>) {
    let mut removed = None;
    let next = remove_in(elements, id, &mut removed);
    (next, removed)
}

fn remove_in(elements: &[Element], id: ElementId, removed: &mut Option<Element>) -> Vec<Element> {
    let mut out = Vec::with_capacity(elements.len());
    for el in elements {
        if el.id == id && removed.is_none() {
            *removed = Some(el.clone());
            continue;
        }
        let mut el = el.clone();
        if let Some(children) = &el.children {
            el.children = Some(remove_in(children, id, removed));
        }
        out.push(el);
    }
    out
}

/// Insert an element relative to a target. If the target is missing, or the
/// target is a text leaf and the position is `Inside`, the forest comes back
/// unchanged and the element is dropped.
pub fn insert(elements: &[Element], element: Element, position: InsertPosition) -> Vec<Element> {
    let mut pending = Some(element);
    let next = insert_in(elements, &mut pending, position);
    match pending {
        // Target not found anywhere: no-op.
        Some(_) => elements.to_vec(),
        None => next,
    }
}

fn insert_in(
    elements: &[Element],
    pending: &mut Option<Element>,
    position: InsertPosition,
) -> Vec<Element> {
    let mut out = Vec::with_capacity(elements.len() + 1);
    for el in elements {
        match position {
            InsertPosition::Before(target) if el.id == target && pending.is_some() => {
                if let Some(new_el) = pending.take() {
                    out.push(new_el);
                }
                out.push(el.clone());
                continue;
            }
            InsertPosition::After(target) if el.id == target && pending.is_some() => {
                out.push(el.clone());
                if let Some(new_el) = pending.take() {
                    out.push(new_el);
                }
                continue;
            }
            InsertPosition::Inside(target) if el.id == target && pending.is_some() => {
                let mut el = el.clone();
                // Text leaves never take children.
                if el.accepts_children() {
                    if let Some(new_el) = pending.take() {
                        el.children.get_or_insert_with(Vec::new).push(new_el);
                    }
                }
                out.push(el);
                continue;
            }
            _ => {}
        }
        let mut el = el.clone();
        if let Some(children) = &el.children {
            el.children = Some(insert_in(children, pending, position));
        }
        out.push(el);
    }
    out
}

/// Apply an edit to the element with the given id, wherever it sits.
pub fn update(
    elements: &[Element],
    id: ElementId,
    f: impl FnOnce(&mut Element),
) -> Vec<Element> {
    let mut f = Some(f);
    update_in(elements, id, &mut f)
}

fn update_in<F: FnOnce(&mut Element)>(
    elements: &[Element],
    id: ElementId,
    f: &mut Option<F>,
) -> Vec<Element> {
    let mut out = Vec::with_capacity(elements.len());
    for el in elements {
        let mut el = el.clone();
        if el.id == id {
            if let Some(f) = f.take() {
                f(&mut el);
            }
        } else if let Some(children) = &el.children {
            el.children = Some(update_in(children, id, f));
        }
        out.push(el);
    }
    out
}

/// Set one style entry on an element.
pub fn set_style(
    elements: &[Element],
    id: ElementId,
    key: &str,
    value: impl Into<crate::model::PropValue>,
) -> Vec<Element> {
    let value = value.into();
    update(elements, id, |el| el.styles.insert(key, value))
}

/// Replace a text leaf's content. Non-text elements are left alone.
pub fn set_text(elements: &[Element], id: ElementId, text: &str) -> Vec<Element> {
    update(elements, id, |el| {
        if let crate::model::ElementKind::Text { text: t } = &mut el.kind {
            *t = text.to_string();
        }
    })
}

/// Move a root element to a new canvas position.
pub fn update_canvas_position(
    elements: &[Element],
    id: ElementId,
    pos: CanvasPosition,
) -> Vec<Element> {
    update(elements, id, |el| el.canvas_position = Some(pos))
}

/// Move an element (with its subtree) under a new parent, appended as the
/// last child. Clears the moved element's canvas position — only roots
/// float. Reparenting into the element's own subtree, onto itself, or onto
/// a text leaf is a no-op.
pub fn reparent(elements: &[Element], id: ElementId, new_parent: ElementId) -> Vec<Element> {
    if id == new_parent || is_descendant(elements, id, new_parent) {
        return elements.to_vec();
    }
    match find(elements, new_parent) {
        Some(p) if p.accepts_children() => {}
        _ => return elements.to_vec(),
    }
    let (without, removed) = remove(elements, id);
    let Some(mut moved) = removed else {
        return elements.to_vec();
    };
    moved.canvas_position = None;
    insert(&without, moved, InsertPosition::Inside(new_parent))
}

/// Pull an element out of its parent and make it a canvas root at `pos`.
/// Already-root elements just move.
pub fn detach_to_root(elements: &[Element], id: ElementId, pos: CanvasPosition) -> Vec<Element> {
    let (mut without, removed) = remove(elements, id);
    let Some(mut moved) = removed else {
        return elements.to_vec();
    };
    moved.canvas_position = Some(pos);
    without.push(moved);
    without
}

/// Structural equality that ignores ids and canvas positions — useful for
/// comparing a forest against its parse→generate→parse image, where every
/// id is freshly minted.
pub fn same_shape(a: &[Element], b: &[Element]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.kind == y.kind
                && x.props == y.props
                && x.styles == y.styles
                && x.children.is_some() == y.children.is_some()
                && same_shape(x.child_slice(), y.child_slice())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use pretty_assertions::assert_eq;

    fn sample_forest() -> (Vec<Element>, ElementId, ElementId, ElementId) {
        // div > [ span > [ text ], Button ]
        let text = Element::text("hello");
        let mut span = Element::markup("span");
        let span_id = span.id;
        span.children = Some(vec![text]);
        let button = Element::component("Button");
        let button_id = button.id;
        let mut root = Element::markup("div");
        let root_id = root.id;
        root.children = Some(vec![span, button]);
        root.canvas_position = Some(CanvasPosition::new(0.0, 0.0));
        (vec![root], root_id, span_id, button_id)
    }

    #[test]
    fn find_and_parent() {
        let (forest, root_id, span_id, button_id) = sample_forest();
        assert_eq!(find(&forest, span_id).map(|e| e.label()), Some("span"));
        assert_eq!(find_parent_id(&forest, span_id), Some(root_id));
        assert_eq!(find_parent_id(&forest, root_id), None);
        assert_eq!(find_parent_id(&forest, button_id), Some(root_id));
        assert_eq!(find(&forest, ElementId::fresh()), None);
    }

    #[test]
    fn descendant_checks() {
        let (forest, root_id, span_id, button_id) = sample_forest();
        assert!(is_descendant(&forest, root_id, span_id));
        assert!(is_descendant(&forest, root_id, button_id));
        assert!(!is_descendant(&forest, span_id, button_id));
        // An element is not its own descendant
        assert!(!is_descendant(&forest, root_id, root_id));
    }

    #[test]
    fn remove_keeps_input_intact() {
        let (forest, _, span_id, _) = sample_forest();
        let before = forest.clone();
        let (next, removed) = remove(&forest, span_id);
        assert_eq!(forest, before);
        assert_eq!(removed.map(|e| e.id), Some(span_id));
        assert!(find(&next, span_id).is_none());
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let (forest, ..) = sample_forest();
        let (next, removed) = remove(&forest, ElementId::fresh());
        assert!(removed.is_none());
        assert_eq!(next, forest);
    }

    #[test]
    fn insert_before_and_after() {
        let (forest, _, span_id, _) = sample_forest();
        let new_el = Element::markup("p");
        let new_id = new_el.id;
        let next = insert(&forest, new_el, InsertPosition::Before(span_id));
        let parent = &next[0];
        assert_eq!(parent.child_slice()[0].id, new_id);
        assert_eq!(parent.child_slice()[1].id, span_id);

        let new_el = Element::markup("p");
        let new_id = new_el.id;
        let next = insert(&forest, new_el, InsertPosition::After(span_id));
        assert_eq!(next[0].child_slice()[1].id, new_id);
    }

    #[test]
    fn insert_inside_text_leaf_is_rejected() {
        let (forest, ..) = sample_forest();
        let text_id = forest[0].child_slice()[0].child_slice()[0].id;
        let next = insert(&forest, Element::markup("p"), InsertPosition::Inside(text_id));
        assert_eq!(next, forest);
    }

    #[test]
    fn insert_with_missing_target_is_noop() {
        let (forest, ..) = sample_forest();
        let next = insert(
            &forest,
            Element::markup("p"),
            InsertPosition::Inside(ElementId::fresh()),
        );
        assert_eq!(next, forest);
    }

    #[test]
    fn reparent_clears_canvas_position() {
        let (mut forest, _, span_id, _) = sample_forest();
        let mut floater = Element::markup("aside");
        let floater_id = floater.id;
        floater.canvas_position = Some(CanvasPosition::new(500.0, 500.0));
        forest.push(floater);

        let next = reparent(&forest, floater_id, span_id);
        let moved = find(&next, floater_id).unwrap();
        assert_eq!(moved.canvas_position, None);
        assert_eq!(find_parent_id(&next, floater_id), Some(span_id));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn reparent_into_own_subtree_is_noop() {
        let (forest, root_id, span_id, _) = sample_forest();
        let next = reparent(&forest, root_id, span_id);
        assert_eq!(next, forest);
        let next = reparent(&forest, root_id, root_id);
        assert_eq!(next, forest);
    }

    #[test]
    fn detach_makes_element_a_root() {
        let (forest, _, span_id, _) = sample_forest();
        let next = detach_to_root(&forest, span_id, CanvasPosition::new(50.0, 60.0));
        assert_eq!(next.len(), 2);
        let detached = next.last().unwrap();
        assert_eq!(detached.id, span_id);
        assert_eq!(detached.canvas_position, Some(CanvasPosition::new(50.0, 60.0)));
        assert!(find_parent_id(&next, span_id).is_none());
    }

    #[test]
    fn style_and_text_setters() {
        let (forest, _, span_id, _) = sample_forest();
        let next = set_style(&forest, span_id, "color", "red");
        assert_eq!(
            find(&next, span_id).unwrap().styles.get("color"),
            Some(&crate::model::PropValue::Str("red".into()))
        );

        let text_id = forest[0].child_slice()[0].child_slice()[0].id;
        let next = set_text(&next, text_id, "updated");
        assert_eq!(
            find(&next, text_id).unwrap().kind,
            ElementKind::Text { text: "updated".into() }
        );
        // Setting text on a non-text element changes nothing
        let unchanged = set_text(&forest, span_id, "nope");
        assert_eq!(unchanged, forest);
    }

    #[test]
    fn same_shape_ignores_ids() {
        let (a, ..) = sample_forest();
        let (b, ..) = sample_forest();
        assert!(same_shape(&a, &b));

        let mut c = a.clone();
        if let ElementKind::Markup { tag } = &mut c[0].kind {
            *tag = "section".into();
        }
        assert!(!same_shape(&a, &c));
    }
}
