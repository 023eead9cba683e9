//! Indexable fields and the reserved field-name conventions.

use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;

/// Field name that stores the document key.
///
/// The reserved names and sentinels below are wire conventions shared with
/// existing persistent indexes; changing any of them breaks index
/// compatibility.
pub const DOCUMENT_ID_FIELD_NAME: &str = "__document_id";

/// Field name queries sort on for spatial distance.
pub const DISTANCE_FIELD_NAME: &str = "__distance";

/// Stored stand-in for a null value.
pub const NULL_SENTINEL: &str = "NULL_VALUE";

/// Stored stand-in for an empty string.
pub const EMPTY_STRING_SENTINEL: &str = "EMPTY_STRING";

/// Sidecar suffix marking a logical field as multi-valued.
pub const IS_ARRAY_SUFFIX: &str = "_IsArray";

/// Sidecar suffix marking the numeric range form of a logical field.
pub const RANGE_SUFFIX: &str = "_Range";

/// Sidecar suffix marking a stored value as serialized JSON.
pub const CONVERT_TO_JSON_SUFFIX: &str = "_ConvertToJson";

/// All reserved sidecar suffixes. Fields whose names end with one of these
/// never appear as user-visible projection keys.
pub const SIDECAR_SUFFIXES: [&str; 3] = [IS_ARRAY_SUFFIX, RANGE_SUFFIX, CONVERT_TO_JSON_SUFFIX];

/// Check whether a field name is a reserved sidecar.
pub fn is_sidecar_field(name: &str) -> bool {
    SIDECAR_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// A single field of an indexable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The field name. Documents may carry several fields with the same
    /// name; together with the `_IsArray` sidecar they form one logical
    /// multi-valued field.
    pub name: String,

    /// The field value.
    pub value: FieldValue,

    /// Whether the value is kept in the index for retrieval.
    pub stored: bool,

    /// Whether the value participates in the inverted index.
    pub indexed: bool,

    /// Whether an indexed value is passed through the field analyzer or
    /// indexed as a single term.
    pub analyzed: bool,
}

impl Field {
    /// Create a stored, analyzed text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            value: FieldValue::Text(value.into()),
            stored: true,
            indexed: true,
            analyzed: true,
        }
    }

    /// Create a stored, non-analyzed keyword field.
    pub fn keyword(name: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            value: FieldValue::Text(value.into()),
            stored: true,
            indexed: true,
            analyzed: false,
        }
    }

    /// Create a field with an arbitrary value and flags.
    pub fn new(name: impl Into<String>, value: FieldValue, stored: bool, indexed: bool) -> Self {
        let analyzed = indexed && matches!(value, FieldValue::Text(_));
        Field {
            name: name.into(),
            value,
            stored,
            indexed,
            analyzed,
        }
    }

    /// Mark this field as analyzed or not.
    pub fn with_analyzed(mut self, analyzed: bool) -> Self {
        self.analyzed = analyzed;
        self
    }

    /// Whether this field is a reserved sidecar.
    pub fn is_sidecar(&self) -> bool {
        is_sidecar_field(&self.name)
    }
}
