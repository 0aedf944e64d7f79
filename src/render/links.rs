//! Canonical locators for related entities
//!
//! - detail: `{prefix}/{namespace/}{schema}/detail?query={pk}.eq.{key}`
//! - list:   `{prefix}/{namespace/}{schema}/list?query={remote}.eq.{key}`
//!
//! The query part is itself a filter string of the query language, so a
//! client can follow a link through the same endpoint family. Keys are
//! percent-encoded; a key the filter grammar cannot express yields no link.

use serde_json::Value;

use crate::schema::SchemaDescriptor;

/// Builds links under a fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    prefix: String,
}

impl LinkBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Link to the single entity of `target` whose primary key is `key`
    pub fn detail(&self, target: &SchemaDescriptor, key: &Value) -> Option<String> {
        let key = key_text(key)?;
        Some(format!(
            "{}/{}/detail?query={}.eq.{}",
            self.prefix,
            target.route(),
            target.primary_key(),
            key
        ))
    }

    /// Link to the entities of `target` whose `remote` attribute is `owner_key`
    pub fn list(&self, target: &SchemaDescriptor, remote: &str, owner_key: &Value) -> Option<String> {
        let key = key_text(owner_key)?;
        Some(format!(
            "{}/{}/list?query={}.eq.{}",
            self.prefix,
            target.route(),
            remote,
            key
        ))
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new("/api")
    }
}

/// Encoded text of a key value; composite or null keys have no link
fn key_text(key: &Value) -> Option<String> {
    let text = match key {
        Value::String(s) if expressible(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(_) | Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    Some(urlencoding::encode(&text).into_owned())
}

/// Whether `key` reads back as itself in an `eq` comparison
fn expressible(key: &str) -> bool {
    !key.is_empty() && key != "null" && !key.contains(|c| matches!(c, ',' | '(' | ')'))
}
