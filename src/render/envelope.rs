//! Relation envelope: `{"self": ..., "link": ...}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A possibly-truncated relation expansion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Rendered related entity (or list of entities); `None` when not expanded
    #[serde(rename = "self")]
    pub value: Option<Value>,
    /// Locator of the related entity or collection
    pub link: Option<String>,
}

impl Envelope {
    /// `{null, null}`: nothing to expand and nothing to point at
    pub fn empty() -> Self {
        Self::default()
    }

    /// `{null, link}`: not expanded, but resolvable through the link
    pub fn link_only(link: Option<String>) -> Self {
        Self { value: None, link }
    }

    pub fn expanded(value: Value, link: Option<String>) -> Self {
        Self {
            value: Some(value),
            link,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.value.is_some()
    }

    /// Converts to JSON without going through a fallible serializer
    pub fn into_value(self) -> Value {
        let mut map = Map::with_capacity(2);
        map.insert("self".to_string(), self.value.unwrap_or(Value::Null));
        map.insert(
            "link".to_string(),
            self.link.map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_value_matches_serde() {
        let envelopes = [
            Envelope::empty(),
            Envelope::link_only(Some("/api/Pet/detail?query=id.eq.1".into())),
            Envelope::expanded(json!({"id": 1}), None),
        ];
        for envelope in envelopes {
            let via_serde = serde_json::to_value(&envelope).unwrap();
            assert_eq!(envelope.into_value(), via_serde);
        }
    }

    #[test]
    fn test_self_key() {
        let value = Envelope::link_only(Some("x".into())).into_value();
        assert_eq!(value, json!({"self": null, "link": "x"}));
    }
}
