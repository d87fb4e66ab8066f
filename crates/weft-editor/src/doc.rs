//! The persisted canvas document.
//!
//! A document is the forest plus bookkeeping the editor shell needs when
//! reopening a canvas: timestamps, the saved viewport, and free-form
//! metadata. Serialized as camelCase JSON so documents interchange with the
//! rest of the toolchain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use weft_core::model::{CanvasPosition, Element};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDoc {
    pub id: String,
    pub name: String,
    pub elements: Vec<Element>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Saved zoom level, absent on documents from before viewport persistence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<CanvasPosition>,
    /// Free-form extras (source file association, tags).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl CanvasDoc {
    pub fn new(id: impl Into<String>, name: impl Into<String>, elements: Vec<Element>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            elements,
            created_at: now,
            updated_at: now,
            zoom: None,
            pan: None,
            metadata: None,
        }
    }

    /// Swap in an edited forest and bump the modification time.
    pub fn touch(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weft_core::tree;

    #[test]
    fn document_roundtrips_through_json() {
        let mut doc = CanvasDoc::new("doc-1", "Landing", vec![Element::markup("div")]);
        doc.zoom = Some(0.75);
        doc.pan = Some(CanvasPosition::new(-120.0, 40.0));

        let json = serde_json::to_string(&doc).unwrap();
        let back: CanvasDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Landing");
        assert_eq!(back.zoom, Some(0.75));
        assert!(tree::same_shape(&back.elements, &doc.elements));
    }

    #[test]
    fn absent_viewport_fields_stay_out_of_the_json() {
        let doc = CanvasDoc::new("doc-2", "Empty", vec![]);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("zoom"));
        assert!(!json.contains("pan"));
        assert!(!json.contains("metadata"));
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn touch_updates_timestamp_only_forward() {
        let mut doc = CanvasDoc::new("doc-3", "T", vec![]);
        let created = doc.created_at;
        doc.touch(vec![Element::markup("span")]);
        assert!(doc.updated_at >= created);
        assert_eq!(doc.created_at, created);
        assert_eq!(doc.elements.len(), 1);
    }
}
