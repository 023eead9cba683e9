//! The indexable document record.
//!
//! A [`Document`] is an ordered collection of [`Field`]s produced by a view
//! transformation. Field order is preserved and duplicate names are allowed;
//! repeated names plus the `_IsArray` sidecar represent one logical
//! multi-valued field.

use serde::{Deserialize, Serialize};

use crate::document::field::{Field, DOCUMENT_ID_FIELD_NAME};
use crate::document::field_value::FieldValue;

/// An ordered collection of fields to be written to the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document { fields: Vec::new() }
    }

    /// Create a document keyed by the given document id.
    pub fn with_id(key: impl Into<String>) -> Self {
        let mut doc = Document::new();
        doc.push(Field::keyword(DOCUMENT_ID_FIELD_NAME, key));
        doc
    }

    /// Append a field. Existing fields with the same name are kept.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Append a field, builder style.
    pub fn with_field(mut self, field: Field) -> Self {
        self.push(field);
        self
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The first field with the given name, if any.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields with the given name, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> {
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// Whether any field has the given name.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document key, taken from the reserved id field.
    pub fn document_key(&self) -> Option<&str> {
        self.get(DOCUMENT_ID_FIELD_NAME)
            .and_then(|f| f.value.as_text())
    }

    /// Produce an independent deep copy of this document.
    ///
    /// Observers that outlive the indexing pass (extensions) receive clones
    /// so later writer mutations cannot reach them. Numeric fields keep
    /// their numeric kind, binary fields copy their bytes, and text fields
    /// keep their stored flag and indexing mode.
    pub fn deep_clone(&self) -> Document {
        let fields = self
            .fields
            .iter()
            .map(|field| Field {
                name: field.name.clone(),
                value: match &field.value {
                    FieldValue::Text(s) => FieldValue::Text(s.clone()),
                    FieldValue::Int(v) => FieldValue::Int(*v),
                    FieldValue::Long(v) => FieldValue::Long(*v),
                    FieldValue::Float(v) => FieldValue::Float(*v),
                    FieldValue::Double(v) => FieldValue::Double(*v),
                    FieldValue::Boolean(v) => FieldValue::Boolean(*v),
                    FieldValue::Binary(data) => FieldValue::Binary(data.clone()),
                    FieldValue::DateTime(v) => FieldValue::DateTime(*v),
                    FieldValue::Null => FieldValue::Null,
                },
                stored: field.stored,
                indexed: field.indexed,
                analyzed: field.analyzed,
            })
            .collect();

        Document { fields }
    }

    /// Estimated in-memory footprint in bytes. Used by the temp-index
    /// promotion check.
    pub fn estimated_size(&self) -> usize {
        self.fields
            .iter()
            .map(|field| {
                field.name.len()
                    + match &field.value {
                        FieldValue::Text(s) => s.len(),
                        FieldValue::Binary(data) => data.len(),
                        _ => 8,
                    }
                    + 16
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key() {
        let doc = Document::with_id("users/1");
        assert_eq!(doc.document_key(), Some("users/1"));
        assert!(Document::new().document_key().is_none());
    }

    #[test]
    fn test_duplicate_names_preserved_in_order() {
        let doc = Document::new()
            .with_field(Field::text("tag", "a"))
            .with_field(Field::text("tag", "b"));

        let values: Vec<&str> = doc
            .get_all("tag")
            .filter_map(|f| f.value.as_text())
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = Document::with_id("users/1")
            .with_field(Field::new("weight", FieldValue::Double(1.5), true, true))
            .with_field(Field::new(
                "raw",
                FieldValue::Binary(vec![1, 2, 3]),
                true,
                false,
            ));

        let clone = original.deep_clone();
        assert_eq!(clone, original);

        // The clone shares no buffers with the original.
        let original_ptr = original.get("raw").unwrap().value.as_binary().unwrap().as_ptr();
        let clone_ptr = clone.get("raw").unwrap().value.as_binary().unwrap().as_ptr();
        assert_ne!(original_ptr, clone_ptr);
    }

    #[test]
    fn test_deep_clone_preserves_flags_and_kinds() {
        let doc = Document::new()
            .with_field(Field::text("body", "text").with_analyzed(true))
            .with_field(Field::new("count", FieldValue::Int(3), false, true));

        let clone = doc.deep_clone();
        let body = clone.get("body").unwrap();
        assert!(body.stored && body.analyzed);

        let count = clone.get("count").unwrap();
        assert!(!count.stored);
        assert!(matches!(count.value, FieldValue::Int(3)));
    }
}
