//! Schema graph: the registry of every entity type
//!
//! Built once at startup and read-only afterwards. Relations point at their
//! targets through [`SchemaId`] handles, so a graph may be cyclic
//! (`Person.pets -> Pet.owner -> Person`).

use std::collections::{HashMap, HashSet};

use super::errors::{SchemaError, SchemaResult};
use super::types::{
    Attribute, AttributeKind, Cardinality, Relation, SchemaDef, SchemaDescriptor, SchemaId,
};

/// Arena of schema descriptors indexed by name
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    schemas: Vec<SchemaDescriptor>,
    index: HashMap<String, SchemaId>,
}

impl SchemaGraph {
    /// Starts a builder
    pub fn builder() -> SchemaGraphBuilder {
        SchemaGraphBuilder::default()
    }

    /// Looks up a schema by name
    pub fn get(&self, name: &str) -> Option<&SchemaDescriptor> {
        self.index.get(name).map(|id| &self.schemas[id.0])
    }

    /// Returns the schema behind a handle issued by this graph.
    ///
    /// Panics if the handle belongs to another graph.
    pub fn schema(&self, id: SchemaId) -> &SchemaDescriptor {
        &self.schemas[id.0]
    }

    /// Target schema of a relation
    pub fn target(&self, relation: &Relation) -> &SchemaDescriptor {
        self.schema(relation.target)
    }

    /// Looks up an attribute on a schema
    pub fn attribute<'a>(&'a self, schema: &'a SchemaDescriptor, name: &str) -> Option<&'a Attribute> {
        schema.attribute(name)
    }

    /// Name of the schema's primary key attribute
    pub fn primary_key_name<'a>(&self, schema: &'a SchemaDescriptor) -> &'a str {
        schema.primary_key()
    }

    /// All schemas in registration order
    pub fn schemas(&self) -> &[SchemaDescriptor] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Collects schema definitions and resolves them into a [`SchemaGraph`]
#[derive(Debug, Clone, Default)]
pub struct SchemaGraphBuilder {
    defs: Vec<SchemaDef>,
}

impl SchemaGraphBuilder {
    /// Adds a definition (chainable)
    pub fn schema(mut self, def: SchemaDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Adds a definition
    pub fn add(&mut self, def: SchemaDef) {
        self.defs.push(def);
    }

    /// Resolves names into handles and validates every definition.
    pub fn build(self) -> SchemaResult<SchemaGraph> {
        let mut index = HashMap::with_capacity(self.defs.len());
        for (position, def) in self.defs.iter().enumerate() {
            if index.insert(def.name.clone(), SchemaId(position)).is_some() {
                return Err(SchemaError::DuplicateSchema(def.name.clone()));
            }
        }

        let mut schemas = Vec::with_capacity(self.defs.len());
        for (position, def) in self.defs.iter().enumerate() {
            schemas.push(resolve_schema(SchemaId(position), def, &index)?);
        }

        let graph = SchemaGraph { schemas, index };
        check_remotes(&graph)?;
        Ok(graph)
    }
}

fn resolve_schema(
    id: SchemaId,
    def: &SchemaDef,
    index: &HashMap<String, SchemaId>,
) -> SchemaResult<SchemaDescriptor> {
    let mut seen = HashSet::new();
    let mut attributes = Vec::with_capacity(def.attributes.len());

    for attr in &def.attributes {
        if !seen.insert(attr.name.as_str()) {
            return Err(SchemaError::DuplicateAttribute {
                schema: def.name.clone(),
                attribute: attr.name.clone(),
            });
        }

        let kind = match attr.relation {
            None => AttributeKind::Scalar(attr.scalar.unwrap_or_default()),
            Some(cardinality) => {
                let target_name = attr.target.as_ref().ok_or_else(|| SchemaError::MissingTarget {
                    schema: def.name.clone(),
                    attribute: attr.name.clone(),
                })?;
                let target = *index.get(target_name).ok_or_else(|| SchemaError::UnknownTarget {
                    schema: def.name.clone(),
                    attribute: attr.name.clone(),
                    target: target_name.clone(),
                })?;
                if cardinality == Cardinality::ToMany && attr.remote.is_none() {
                    return Err(SchemaError::MissingRemote {
                        schema: def.name.clone(),
                        attribute: attr.name.clone(),
                    });
                }
                AttributeKind::Relation(Relation {
                    cardinality,
                    nullable: attr.nullable,
                    target,
                    remote: attr.remote.clone(),
                })
            }
        };

        attributes.push(Attribute {
            name: attr.name.clone(),
            kind,
        });
    }

    if !seen.contains(def.primary_key.as_str()) {
        return Err(SchemaError::MissingPrimaryKey {
            schema: def.name.clone(),
            attribute: def.primary_key.clone(),
        });
    }

    Ok(SchemaDescriptor {
        id,
        name: def.name.clone(),
        namespace: def.namespace.clone(),
        primary_key: def.primary_key.clone(),
        attributes,
    })
}

/// Every to-many relation must name an attribute that exists on its target.
fn check_remotes(graph: &SchemaGraph) -> SchemaResult<()> {
    for schema in graph.schemas() {
        for (attr, relation) in schema.relations() {
            let Some(remote) = &relation.remote else {
                continue;
            };
            let target = graph.target(relation);
            if target.attribute(remote).is_none() {
                return Err(SchemaError::UnknownRemote {
                    attribute: attr.name.clone(),
                    remote: remote.clone(),
                    target: target.name().to_string(),
                });
            }
        }
    }
    Ok(())
}
