//! Tagged outcome of a single upstream lookup.
//!
//! Every adapter reports through `Lookup<T>` instead of raising: the caller
//! matches on the variant and decides whether a miss becomes a 404, an inline
//! marker in a larger response, or a degraded value.
//!
//! On the wire a `Lookup<T>` is either `T` itself or the inline error marker
//! `{"error": "<message>"}`.

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The upstream returned usable data.
    Found(T),
    /// The upstream answered, but has no record for the key.
    NotFound(String),
    /// Transport failure or an unexpected payload shape.
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Error message carried by a miss, `None` when data was found.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Found(_) => None,
            Self::NotFound(msg) | Self::Failed(msg) => Some(msg),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            _ => None,
        }
    }

    /// Chain a dependent lookup; misses short-circuit with their message intact.
    pub fn and_then<U, F: FnOnce(T) -> Lookup<U>>(self, f: F) -> Lookup<U> {
        match self {
            Self::Found(v) => f(v),
            Self::NotFound(msg) => Lookup::NotFound(msg),
            Self::Failed(msg) => Lookup::Failed(msg),
        }
    }
}

impl<T: Serialize> Serialize for Lookup<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(v) => v.serialize(serializer),
            Self::NotFound(msg) | Self::Failed(msg) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", msg)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_found_serializes_as_payload() {
        let hit: Lookup<Vec<u32>> = Lookup::Found(vec![1, 2]);
        assert_eq!(serde_json::to_value(&hit).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_misses_serialize_as_inline_marker() {
        let nf: Lookup<u32> = Lookup::not_found("nothing here");
        let failed: Lookup<u32> = Lookup::failed("connection reset");
        assert_eq!(serde_json::to_value(&nf).unwrap(), json!({"error": "nothing here"}));
        assert_eq!(serde_json::to_value(&failed).unwrap(), json!({"error": "connection reset"}));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let miss: Lookup<u32> = Lookup::not_found("step one");
        let chained = miss.and_then(|v| Lookup::Found(v + 1));
        assert_eq!(chained, Lookup::NotFound("step one".to_string()));

        let hit: Lookup<u32> = Lookup::Found(1);
        assert_eq!(hit.and_then(|v| Lookup::Found(v + 1)), Lookup::Found(2));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(Lookup::Found(3).error_message(), None);
        assert_eq!(Lookup::<u8>::failed("boom").error_message(), Some("boom"));
    }
}
