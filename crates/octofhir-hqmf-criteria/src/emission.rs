//! Emission records: the nested key-value form handed to serializers

use indexmap::IndexMap;
use octofhir_hqmf_diagnostics::{HQMF0402, HqmfError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Insertion-ordered mapping of an emission record
pub type Mapping = IndexMap<String, EmissionValue>;

/// A structured value in an emission record.
///
/// Serializes to plain JSON (`null`, booleans, numbers, strings, arrays and
/// objects) with mapping keys in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmissionValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<EmissionValue>),
    Mapping(Mapping),
}

impl EmissionValue {
    /// An empty mapping
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, or an empty string, sequence or mapping
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Mapping(map) => map.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[EmissionValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this is a mapping
    pub fn get(&self, key: &str) -> Option<&EmissionValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Convert to a `serde_json::Value`. Object keys of the result follow
    /// `serde_json`'s map ordering, not insertion order.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::from(self.clone())
    }

    /// Serialize to JSON text with mapping keys in insertion order
    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        text.map_err(|e| HqmfError::system(HQMF0402, format!("Failed to serialize emission record: {}", e)))
    }
}

impl From<&str> for EmissionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EmissionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for EmissionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Mapping> for EmissionValue {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<Vec<EmissionValue>> for EmissionValue {
    fn from(value: Vec<EmissionValue>) -> Self {
        Self::Sequence(value)
    }
}

impl<T: Into<EmissionValue>> From<Option<T>> for EmissionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl From<JsonValue> for EmissionValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::Number(n),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<EmissionValue> for JsonValue {
    fn from(value: EmissionValue) -> Self {
        match value {
            EmissionValue::Null => JsonValue::Null,
            EmissionValue::Bool(b) => JsonValue::Bool(b),
            EmissionValue::Number(n) => JsonValue::Number(n),
            EmissionValue::String(s) => JsonValue::String(s),
            EmissionValue::Sequence(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            EmissionValue::Mapping(map) => {
                JsonValue::Object(map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_preserves_structure() {
        let source = json!({
            "type": "CD",
            "codes": ["1", "2"],
            "inclusive": true,
            "count": 3,
            "missing": null
        });
        let value = EmissionValue::from(source.clone());

        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("CD"));
        assert_eq!(value.get("codes").and_then(|v| v.as_sequence()).map(|s| s.len()), Some(2));
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn test_serializes_untagged_in_insertion_order() {
        let mut map = Mapping::new();
        map.insert("title".to_string(), "X".into());
        map.insert("status".to_string(), EmissionValue::Null);
        map.insert("section".to_string(), "conditions".into());

        let out = serde_json::to_string(&EmissionValue::Mapping(map)).unwrap();
        assert_eq!(out, r#"{"title":"X","status":null,"section":"conditions"}"#);
    }

    #[test]
    fn test_json_text_keeps_insertion_order() {
        let mut record = Mapping::new();
        record.insert("title".to_string(), "X".into());
        record.insert("section".to_string(), "conditions".into());
        let mut records = Mapping::new();
        records.insert("zeta".to_string(), EmissionValue::Mapping(record.clone()));
        records.insert("alpha".to_string(), EmissionValue::Mapping(record));

        let out = EmissionValue::Mapping(records).to_json_string(false).unwrap();
        assert_eq!(
            out,
            r#"{"zeta":{"title":"X","section":"conditions"},"alpha":{"title":"X","section":"conditions"}}"#
        );
    }

    #[test]
    fn test_blankness() {
        assert!(EmissionValue::Null.is_blank());
        assert!(EmissionValue::from("").is_blank());
        assert!(EmissionValue::mapping().is_blank());
        assert!(EmissionValue::Sequence(vec![]).is_blank());
        assert!(!EmissionValue::from(false).is_blank());
        assert!(!EmissionValue::from(Some("a")).is_blank());
        assert!(EmissionValue::from(None::<String>).is_null());
    }
}
