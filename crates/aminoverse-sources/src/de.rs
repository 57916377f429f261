//! Serde helpers for upstream payloads whose optional fields are not always the shape the docs promise.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, substituting `T::default()` when the field is null or has the wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a list element by element, dropping the elements that do not fit `T`.
/// A value that is not an array yields an empty list.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Strings and numbers both render to text; empty strings count as absent.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Ok(None),
    };
    Ok(Some(text).filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "lenient_seq")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "lenient_text")]
        value: Option<String>,
    }

    #[test]
    fn test_wrong_shape_falls_back_to_default() {
        let p: Sample = serde_json::from_value(json!({"names": {"oops": 1}, "value": [1]})).unwrap();
        assert!(p.names.is_empty());
        assert_eq!(p.value, None);
    }

    #[test]
    fn test_null_and_missing_fields() {
        let p: Sample = serde_json::from_value(json!({"names": null})).unwrap();
        assert!(p.names.is_empty());
        assert_eq!(p.value, None);
    }

    #[test]
    fn test_sequence_keeps_well_formed_items() {
        let p: Sample = serde_json::from_value(json!({"tags": ["a", null, 3, "b", {"c": 1}]})).unwrap();
        assert_eq!(p.tags, vec!["a", "b"]);

        let p: Sample = serde_json::from_value(json!({"tags": {"a": 1}})).unwrap();
        assert!(p.tags.is_empty());
    }

    #[test]
    fn test_numbers_render_as_text() {
        let p: Sample = serde_json::from_value(json!({"value": 12.5})).unwrap();
        assert_eq!(p.value.as_deref(), Some("12.5"));
        let p: Sample = serde_json::from_value(json!({"value": "  "})).unwrap();
        assert_eq!(p.value, None);
    }
}
