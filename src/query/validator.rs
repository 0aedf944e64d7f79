//! Attribute-path validation
//!
//! Walks a dot-separated attribute chain against the schema graph. Only
//! relation attributes may be traversed; the literal segment `pk` stands for
//! the primary key of the schema it is evaluated on.

use serde::Serialize;

use crate::schema::{AttributeKind, ScalarType, SchemaGraph, SchemaId};

use super::errors::{QueryError, QueryResult};

/// Segment that resolves to the current schema's primary key
pub const PK_ALIAS: &str = "pk";

/// A path that exists in the schema graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPath {
    /// Segments with `pk` replaced by the actual primary key name
    pub segments: Vec<String>,
    /// Schema owning the terminal attribute
    #[serde(skip)]
    pub owner: SchemaId,
    /// Type literals compared against this path convert to
    pub value_type: ScalarType,
    /// True if the terminal attribute is a relation
    pub relation: bool,
}

impl ResolvedPath {
    /// Dot-joined path
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Name of the terminal attribute
    pub fn terminal(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

/// Validates `path` starting at `root`.
///
/// A terminal relation segment is accepted; it compares the related
/// entity's key and is typed by the target's primary key.
pub fn validate(path: &[String], root: SchemaId, graph: &SchemaGraph) -> QueryResult<ResolvedPath> {
    if path.is_empty() {
        return Err(QueryError::malformed("", ""));
    }

    let mut current = graph.schema(root);
    let mut segments = Vec::with_capacity(path.len());

    for (index, segment) in path.iter().enumerate() {
        let is_last = index + 1 == path.len();
        let name = if segment == PK_ALIAS {
            graph.primary_key_name(current)
        } else {
            segment.as_str()
        };

        let attribute = graph
            .attribute(current, name)
            .ok_or_else(|| QueryError::UnknownAttribute {
                attribute: segment.clone(),
                schema: current.name().to_string(),
            })?;
        segments.push(attribute.name.clone());

        match &attribute.kind {
            AttributeKind::Scalar(ty) => {
                if !is_last {
                    return Err(QueryError::NonTerminalLeafAttribute {
                        attribute: attribute.name.clone(),
                        schema: current.name().to_string(),
                    });
                }
                return Ok(ResolvedPath {
                    segments,
                    owner: current.id(),
                    value_type: *ty,
                    relation: false,
                });
            }
            AttributeKind::Relation(relation) => {
                let target = graph.target(relation);
                if is_last {
                    let value_type = target
                        .attribute(target.primary_key())
                        .and_then(|pk| pk.scalar_type())
                        .unwrap_or_default();
                    return Ok(ResolvedPath {
                        segments,
                        owner: current.id(),
                        value_type,
                        relation: true,
                    });
                }
                current = target;
            }
        }
    }

    Err(QueryError::malformed(&path.join("."), &path.join(".")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDef;

    fn graph() -> SchemaGraph {
        SchemaGraph::builder()
            .schema(
                SchemaDef::new("Person")
                    .scalar("id", ScalarType::Int)
                    .scalar("name", ScalarType::String)
                    .to_many("pets", "Pet", "owner"),
            )
            .schema(
                SchemaDef::new("Pet")
                    .primary_key("tag")
                    .scalar("tag", ScalarType::String)
                    .scalar("name", ScalarType::String)
                    .to_one("owner", "Person", true),
            )
            .build()
            .unwrap()
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relation_then_scalar() {
        let graph = graph();
        let pet = graph.get("Pet").unwrap().id();
        let resolved = validate(&path(&["owner", "name"]), pet, &graph).unwrap();
        assert_eq!(resolved.dotted(), "owner.name");
        assert_eq!(resolved.owner, graph.get("Person").unwrap().id());
        assert_eq!(resolved.value_type, ScalarType::String);
        assert!(!resolved.relation);
    }

    #[test]
    fn test_scalar_cannot_be_traversed() {
        let graph = graph();
        let pet = graph.get("Pet").unwrap().id();
        let err = validate(&path(&["name", "owner"]), pet, &graph).unwrap_err();
        assert_eq!(
            err,
            QueryError::NonTerminalLeafAttribute {
                attribute: "name".into(),
                schema: "Pet".into()
            }
        );
    }

    #[test]
    fn test_unknown_attribute_names_schema() {
        let graph = graph();
        let pet = graph.get("Pet").unwrap().id();
        let err = validate(&path(&["owner", "age"]), pet, &graph).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownAttribute {
                attribute: "age".into(),
                schema: "Person".into()
            }
        );
    }

    #[test]
    fn test_pk_alias_resolves_per_schema() {
        let graph = graph();
        let person = graph.get("Person").unwrap().id();
        let resolved = validate(&path(&["pets", "pk"]), person, &graph).unwrap();
        assert_eq!(resolved.segments, vec!["pets", "tag"]);
        assert_eq!(resolved.value_type, ScalarType::String);

        let resolved = validate(&path(&["pk"]), person, &graph).unwrap();
        assert_eq!(resolved.segments, vec!["id"]);
        assert_eq!(resolved.value_type, ScalarType::Int);
    }

    #[test]
    fn test_terminal_relation_typed_by_target_key() {
        let graph = graph();
        let pet = graph.get("Pet").unwrap().id();
        let resolved = validate(&path(&["owner"]), pet, &graph).unwrap();
        assert!(resolved.relation);
        assert_eq!(resolved.value_type, ScalarType::Int);
    }

    #[test]
    fn test_cyclic_paths_are_walkable() {
        let graph = graph();
        let pet = graph.get("Pet").unwrap().id();
        let resolved = validate(&path(&["owner", "pets", "owner", "name"]), pet, &graph).unwrap();
        assert_eq!(resolved.terminal(), "name");
    }
}
