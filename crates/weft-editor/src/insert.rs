//! Insert palette: turning a scanned component (or a plain tag) into a
//! ready-to-drop element.
//!
//! New elements land at a fixed spot on the canvas and carry just enough
//! defaults to render: required props get placeholder values derived from
//! their type annotation text, optional props stay absent so the component's
//! own defaults apply.

use weft_core::model::{CanvasPosition, ComponentIndexEntry, Element, PropValue, ValueBag};

/// Where freshly inserted elements land.
pub const INSERT_POSITION: CanvasPosition = CanvasPosition { x: 100.0, y: 100.0 };

/// Type annotations the palette cannot invent a value for.
fn is_opaque_type(ty: &str) -> bool {
    ty.contains("=>")
        || ty.contains("ComponentType")
        || ty.contains("Element")
        || ty.contains("CSSProperties")
}

/// Instantiate a component from its index entry: seeded required props, an
/// empty children slot when the schema has a `children` prop, and a canvas
/// position.
pub fn instantiate_component(name: &str, entry: &ComponentIndexEntry) -> Element {
    let mut props = ValueBag::new();
    let mut has_children = false;

    // Deterministic seeding order regardless of map iteration.
    let mut prop_names: Vec<&String> = entry.props.keys().collect();
    prop_names.sort();

    for prop_name in prop_names {
        let schema = &entry.props[prop_name];
        if prop_name == "children" {
            has_children = true;
            continue;
        }
        if is_opaque_type(&schema.ty) {
            continue;
        }
        if !schema.required {
            continue;
        }
        if let Some(value) = default_for_type(&schema.ty, prop_name) {
            props.insert(prop_name.clone(), value);
        }
    }

    let mut el = Element::component(name);
    el.props = props;
    el.children = if has_children { Some(Vec::new()) } else { None };
    el.canvas_position = Some(INSERT_POSITION);
    el
}

/// Instantiate a plain markup element for the HTML palette tab.
pub fn instantiate_markup(tag: &str) -> Element {
    let mut el = Element::markup(tag);
    el.canvas_position = Some(INSERT_POSITION);
    el
}

/// A placeholder value for a required prop, from its annotation text.
fn default_for_type(ty: &str, prop_name: &str) -> Option<PropValue> {
    // String-literal unions: pick the first usable variant.
    if ty.contains('|') && (ty.contains('"') || ty.contains('\'')) {
        return ty
            .split('|')
            .map(|part| part.trim().trim_matches(['"', '\'']))
            .find(|opt| !opt.is_empty() && *opt != "undefined" && *opt != "null")
            .map(|opt| PropValue::Str(opt.to_string()));
    }
    if ty.contains("string") {
        // The prop's own name doubles as a visible placeholder.
        return Some(PropValue::Str(prop_name.to_string()));
    }
    if ty.contains("number") {
        return Some(PropValue::Num(0.0));
    }
    if ty.contains("boolean") {
        return Some(PropValue::Bool(false));
    }
    None
}
