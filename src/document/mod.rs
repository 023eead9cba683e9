//! Indexable document records and their fields.

pub mod document;
pub mod field;
pub mod field_value;

pub use document::Document;
pub use field::{
    Field, CONVERT_TO_JSON_SUFFIX, DISTANCE_FIELD_NAME, DOCUMENT_ID_FIELD_NAME,
    EMPTY_STRING_SENTINEL, IS_ARRAY_SUFFIX, NULL_SENTINEL, RANGE_SUFFIX, SIDECAR_SUFFIXES,
};
pub use field_value::FieldValue;
