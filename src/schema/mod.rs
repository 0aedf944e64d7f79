//! Schema registry
//!
//! Entity types, their attributes and the relations between them. The
//! graph is built once (programmatically or from schema files) and shared
//! read-only by the query compiler, the relation planner and the renderer.

mod errors;
mod graph;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use graph::{SchemaGraph, SchemaGraphBuilder};
pub use loader::SchemaLoader;
pub use types::{
    Attribute, AttributeDef, AttributeKind, Cardinality, Relation, ScalarType, SchemaDef,
    SchemaDescriptor, SchemaId,
};
