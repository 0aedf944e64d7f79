//! Schema error types
//!
//! Error codes:
//! - SNATCH_SCHEMA_DUPLICATE
//! - SNATCH_SCHEMA_DUPLICATE_ATTRIBUTE
//! - SNATCH_SCHEMA_MISSING_PRIMARY_KEY
//! - SNATCH_SCHEMA_MISSING_TARGET
//! - SNATCH_SCHEMA_UNKNOWN_TARGET
//! - SNATCH_SCHEMA_MISSING_REMOTE
//! - SNATCH_SCHEMA_UNKNOWN_REMOTE
//! - SNATCH_SCHEMA_MALFORMED
//!
//! All schema errors are fatal at startup: a graph is either fully built or
//! not returned.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Schema '{0}' is declared more than once")]
    DuplicateSchema(String),

    #[error("Attribute '{attribute}' is declared more than once on schema '{schema}'")]
    DuplicateAttribute { schema: String, attribute: String },

    #[error("Schema '{schema}' has no primary key attribute '{attribute}'")]
    MissingPrimaryKey { schema: String, attribute: String },

    #[error("Relation '{attribute}' on schema '{schema}' does not name a target")]
    MissingTarget { schema: String, attribute: String },

    #[error("Relation '{attribute}' on schema '{schema}' targets unknown schema '{target}'")]
    UnknownTarget {
        schema: String,
        attribute: String,
        target: String,
    },

    #[error("To-many relation '{attribute}' on schema '{schema}' must name its remote attribute")]
    MissingRemote { schema: String, attribute: String },

    #[error("Remote attribute '{remote}' of relation '{attribute}' does not exist on schema '{target}'")]
    UnknownRemote {
        attribute: String,
        remote: String,
        target: String,
    },

    #[error("Malformed schema file '{path}': {reason}")]
    MalformedSchema { path: String, reason: String },
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateSchema(_) => "SNATCH_SCHEMA_DUPLICATE",
            SchemaError::DuplicateAttribute { .. } => "SNATCH_SCHEMA_DUPLICATE_ATTRIBUTE",
            SchemaError::MissingPrimaryKey { .. } => "SNATCH_SCHEMA_MISSING_PRIMARY_KEY",
            SchemaError::MissingTarget { .. } => "SNATCH_SCHEMA_MISSING_TARGET",
            SchemaError::UnknownTarget { .. } => "SNATCH_SCHEMA_UNKNOWN_TARGET",
            SchemaError::MissingRemote { .. } => "SNATCH_SCHEMA_MISSING_REMOTE",
            SchemaError::UnknownRemote { .. } => "SNATCH_SCHEMA_UNKNOWN_REMOTE",
            SchemaError::MalformedSchema { .. } => "SNATCH_SCHEMA_MALFORMED",
        }
    }

    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedSchema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
