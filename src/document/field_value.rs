//! Field value types for indexable documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value carried by a document field.
///
/// Numeric values keep their width and kind so observers that deep-copy
/// documents see the same numeric type the transform produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value.
    Text(String),
    /// 32-bit integer value.
    Int(i32),
    /// 64-bit integer value.
    Long(i64),
    /// 32-bit floating point value.
    Float(f32),
    /// 64-bit floating point value.
    Double(f64),
    /// Boolean value.
    Boolean(bool),
    /// Binary data.
    Binary(Vec<u8>),
    /// DateTime value.
    DateTime(DateTime<Utc>),
    /// Null value.
    Null,
}

impl FieldValue {
    /// Get the value as text, if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as binary data, if it is binary.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// Check whether this value is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldValue::Int(_) | FieldValue::Long(_) | FieldValue::Float(_) | FieldValue::Double(_)
        )
    }

    /// The textual form a value is indexed under.
    ///
    /// Numeric values use their decimal rendering, dates RFC 3339, booleans
    /// `true`/`false`. Binary and null values have no indexable form.
    pub fn index_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Int(v) => Some(v.to_string()),
            FieldValue::Long(v) => Some(v.to_string()),
            FieldValue::Float(v) => Some(v.to_string()),
            FieldValue::Double(v) => Some(v.to_string()),
            FieldValue::Boolean(v) => Some(v.to_string()),
            FieldValue::DateTime(v) => Some(v.to_rfc3339()),
            FieldValue::Binary(_) | FieldValue::Null => None,
        }
    }

    /// The JSON rendering of a value used by query projections.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(v) => serde_json::json!(v),
            FieldValue::Long(v) => serde_json::json!(v),
            FieldValue::Float(v) => serde_json::json!(v),
            FieldValue::Double(v) => serde_json::json!(v),
            FieldValue::Boolean(v) => serde_json::Value::Bool(*v),
            FieldValue::Binary(data) => {
                serde_json::Value::Array(data.iter().map(|b| serde_json::json!(b)).collect())
            }
            FieldValue::DateTime(v) => serde_json::Value::String(v.to_rfc3339()),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_text() {
        assert_eq!(FieldValue::Int(42).index_text().as_deref(), Some("42"));
        assert_eq!(
            FieldValue::Text("abc".to_string()).index_text().as_deref(),
            Some("abc")
        );
        assert_eq!(FieldValue::Binary(vec![1, 2]).index_text(), None);
        assert_eq!(FieldValue::Null.index_text(), None);
    }

    #[test]
    fn test_numeric_kinds_are_distinct() {
        assert!(FieldValue::Float(1.0).is_numeric());
        assert_ne!(FieldValue::Float(1.0), FieldValue::Double(1.0));
        assert_ne!(FieldValue::Int(1), FieldValue::Long(1));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(FieldValue::Long(7).to_json(), serde_json::json!(7));
        assert_eq!(FieldValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(
            FieldValue::Binary(vec![3, 4]).to_json(),
            serde_json::json!([3, 4])
        );
    }
}
