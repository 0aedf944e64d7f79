//! Schema type definitions
//!
//! A schema describes one entity type: its ordered attributes, the name of
//! its primary key, and for every relation attribute the target schema,
//! cardinality and nullability.
//!
//! Descriptors never own their targets. A relation stores a [`SchemaId`]
//! handle into the [`SchemaGraph`](super::SchemaGraph) arena, so entity types
//! are free to reference each other in cycles.

use serde::{Deserialize, Serialize};

/// Handle of a schema inside the graph that built it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position of the schema in its graph
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Value types a scalar attribute can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// Calendar date (`YYYY-MM-DD`)
    Date,
    /// Timestamp (RFC 3339 or `YYYY-MM-DDTHH:MM:SS`)
    #[serde(rename = "datetime")]
    DateTime,
    /// Untyped; literals are converted heuristically
    Any,
}

impl ScalarType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::Date => "date",
            ScalarType::DateTime => "datetime",
            ScalarType::Any => "any",
        }
    }

    /// Whether date-part operators (`year`, `month`, `day`) apply
    pub fn has_date_parts(&self) -> bool {
        matches!(self, ScalarType::Date | ScalarType::DateTime | ScalarType::Any)
    }
}

impl Default for ScalarType {
    fn default() -> Self {
        ScalarType::Any
    }
}

/// How many target entities a relation points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    /// Foreign key / one-to-one
    ToOne,
    /// Reverse foreign key / many-to-many
    ToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::ToOne => "to-one",
            Cardinality::ToMany => "to-many",
        }
    }
}

/// Resolved relation metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub cardinality: Cardinality,
    pub nullable: bool,
    pub target: SchemaId,
    /// Attribute on the target pointing back at the owner (to-many only)
    pub remote: Option<String>,
}

/// Attribute kind: a plain value or a reference to other entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    Scalar(ScalarType),
    Relation(Relation),
}

/// A named attribute of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    /// Returns true if the attribute references other entities
    pub fn is_relation(&self) -> bool {
        matches!(self.kind, AttributeKind::Relation(_))
    }

    /// Relation metadata, if this is a relation attribute
    pub fn relation(&self) -> Option<&Relation> {
        match &self.kind {
            AttributeKind::Relation(relation) => Some(relation),
            AttributeKind::Scalar(_) => None,
        }
    }

    /// Scalar type, if this is a scalar attribute
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.kind {
            AttributeKind::Scalar(ty) => Some(*ty),
            AttributeKind::Relation(_) => None,
        }
    }
}

/// Metadata of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub(crate) id: SchemaId,
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
    pub(crate) primary_key: String,
    pub(crate) attributes: Vec<Attribute>,
}

impl SchemaDescriptor {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Name of the primary-key attribute
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Relation attributes in declaration order
    pub fn relations(&self) -> impl Iterator<Item = (&Attribute, &Relation)> {
        self.attributes
            .iter()
            .filter_map(|attr| attr.relation().map(|relation| (attr, relation)))
    }

    /// Route segment used when building links (`namespace/name`)
    pub fn route(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}/{}", namespace, self.name),
            None => self.name.clone(),
        }
    }
}

/// Serializable schema definition, as written in schema files
///
/// Relation targets are referenced by schema name and resolved when the
/// graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

/// Serializable attribute definition
///
/// An attribute with a `relation` is a relation to `target`; otherwise it
/// is a scalar of `type` (`any` when omitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ScalarType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

impl SchemaDef {
    /// Create a definition with an `id` primary key and no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            primary_key: default_primary_key(),
            attributes: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    /// Add a scalar attribute
    pub fn scalar(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.attributes.push(AttributeDef {
            name: name.into(),
            scalar: Some(ty),
            relation: None,
            target: None,
            nullable: false,
            remote: None,
        });
        self
    }

    /// Add a to-one relation
    pub fn to_one(mut self, name: impl Into<String>, target: impl Into<String>, nullable: bool) -> Self {
        self.attributes.push(AttributeDef {
            name: name.into(),
            scalar: None,
            relation: Some(Cardinality::ToOne),
            target: Some(target.into()),
            nullable,
            remote: None,
        });
        self
    }

    /// Add a to-many relation whose rows point back through `remote`
    pub fn to_many(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        remote: impl Into<String>,
    ) -> Self {
        self.attributes.push(AttributeDef {
            name: name.into(),
            scalar: None,
            relation: Some(Cardinality::ToMany),
            target: Some(target.into()),
            nullable: true,
            remote: Some(remote.into()),
        });
        self
    }
}
