//! Core element-tree data model for Weft canvas documents.
//!
//! The canvas holds a forest of element trees. Each root element floats on
//! the canvas at an explicit `CanvasPosition`; nested elements flow inside
//! their parent and never carry a position of their own. An element is one
//! of three kinds: a markup element (plain HTML tag), a component reference
//! (project component by name), or a text leaf.

use crate::id::ElementId;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

// ─── Property values ─────────────────────────────────────────────────────

/// A property or style value. The markup syntax only produces literals —
/// strings, numbers, booleans, and flat object literals (style bags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Num(f64),
    Str(String),
    // Boxed: the bag stores `PropValue`s inline, so the map variant needs
    // indirection to keep the type finitely sized.
    Map(Box<ValueBag>),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            PropValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Num(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<ValueBag> for PropValue {
    fn from(bag: ValueBag) -> Self {
        PropValue::Map(Box::new(bag))
    }
}

// ─── Ordered value bags ──────────────────────────────────────────────────

/// An insertion-ordered string→value map, used for both props and styles.
///
/// Generation must be deterministic: entries come back out in the order the
/// author (or parser) put them in, so a parse→generate cycle never shuffles
/// attributes. Most bags are tiny, hence the inline SmallVec storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBag {
    entries: SmallVec<[(String, PropValue); 4]>,
}

impl ValueBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert a value. An existing key is overwritten in place so its
    /// position in the bag is preserved.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, PropValue)> for ValueBag {
    fn from_iter<T: IntoIterator<Item = (String, PropValue)>>(iter: T) -> Self {
        let mut bag = ValueBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

impl Serialize for ValueBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ValueBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BagVisitor;

        impl<'de> Visitor<'de> for BagVisitor {
            type Value = ValueBag;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ValueBag, A::Error> {
                let mut bag = ValueBag::new();
                while let Some((k, v)) = access.next_entry::<String, PropValue>()? {
                    bag.insert(k, v);
                }
                Ok(bag)
            }
        }

        deserializer.deserialize_map(BagVisitor)
    }
}

// ─── Canvas position ─────────────────────────────────────────────────────

/// Absolute canvas coordinates for a root element. Only roots carry one;
/// reparenting an element under a new parent clears it, detaching back to
/// the canvas assigns a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

impl CanvasPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// The element kinds in the canvas tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementKind {
    /// Plain HTML markup element (`div`, `span`, `button`, ...).
    Markup { tag: String },

    /// Reference to a project component by exported name (`Button`, `Card.Header`).
    Component { name: String },

    /// Text leaf. Never has children or props.
    Text { text: String },
}

/// A single element in the canvas tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique within the forest. Fresh ids are minted on parse and insert —
    /// identity never survives a reparse.
    pub id: ElementId,

    #[serde(flatten)]
    pub kind: ElementKind,

    /// Non-style attributes. Empty for text leaves.
    #[serde(default, skip_serializing_if = "ValueBag::is_empty")]
    pub props: ValueBag,

    /// Inline style declarations, kept separate from props.
    #[serde(default, skip_serializing_if = "ValueBag::is_empty")]
    pub styles: ValueBag,

    /// Ordered children. `None` means the element has no children slot at
    /// all (text leaves, components that accept no children); `Some(vec![])`
    /// is an empty slot that can receive drops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Element>>,

    /// Present exactly when this element is a canvas root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_position: Option<CanvasPosition>,
}

impl Element {
    pub fn markup(tag: impl Into<String>) -> Self {
        Self {
            id: ElementId::fresh(),
            kind: ElementKind::Markup { tag: tag.into() },
            props: ValueBag::new(),
            styles: ValueBag::new(),
            children: Some(Vec::new()),
            canvas_position: None,
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        Self {
            id: ElementId::fresh(),
            kind: ElementKind::Component { name: name.into() },
            props: ValueBag::new(),
            styles: ValueBag::new(),
            children: None,
            canvas_position: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            id: ElementId::fresh(),
            kind: ElementKind::Text { text: text.into() },
            props: ValueBag::new(),
            styles: ValueBag::new(),
            children: None,
            canvas_position: None,
        }
    }

    /// Display label: the tag, the component name, or `#text`.
    pub fn label(&self) -> &str {
        match &self.kind {
            ElementKind::Markup { tag } => tag,
            ElementKind::Component { name } => name,
            ElementKind::Text { .. } => "#text",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, ElementKind::Component { .. })
    }

    /// Children as a slice; empty when there is no children slot.
    pub fn child_slice(&self) -> &[Element] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Mutable children slot. Text leaves never expose one.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        if self.is_text() {
            return None;
        }
        self.children.as_mut()
    }

    /// Whether this element can ever hold children (text leaves cannot).
    pub fn accepts_children(&self) -> bool {
        !self.is_text()
    }
}

// ─── Component index ─────────────────────────────────────────────────────

/// Prop metadata from the project scanner: the raw type annotation text
/// plus whether the prop is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSchema {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub required: bool,
}

/// One scanned component: where it lives and what props it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIndexEntry {
    /// Project-relative source path, e.g. `src/components/Button.tsx`.
    pub path: String,
    /// The exported name to import (may differ from the index key).
    pub export_name: String,
    #[serde(default)]
    pub props: HashMap<String, PropSchema>,
}

/// Component name → scanner entry, produced by the project scanner and
/// consumed by import synthesis and the insert palette.
pub type ComponentIndex = HashMap<String, ComponentIndexEntry>;
