//! Record store errors
//!
//! The single-record resolution policy reports its three outcomes here:
//! no filter given, nothing found, more than one found.

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("A filter is required to retrieve a single '{schema}' record")]
    NoFilterProvided { schema: String },

    #[error("No '{schema}' record matches the filter")]
    RecordNotFound { schema: String },

    #[error("{count} '{schema}' records match the filter; expected exactly one")]
    MultipleRecordsFound { schema: String, count: usize },

    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),

    /// Row rejected on insert
    #[error("Invalid '{schema}' record: {reason}")]
    InvalidRecord { schema: String, reason: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NoFilterProvided { .. } => "SNATCH_STORE_NO_FILTER_PROVIDED",
            StoreError::RecordNotFound { .. } => "SNATCH_STORE_RECORD_NOT_FOUND",
            StoreError::MultipleRecordsFound { .. } => "SNATCH_STORE_MULTIPLE_RECORDS_FOUND",
            StoreError::UnknownSchema(_) => "SNATCH_STORE_UNKNOWN_SCHEMA",
            StoreError::InvalidRecord { .. } => "SNATCH_STORE_INVALID_RECORD",
        }
    }

    pub(crate) fn invalid(schema: &str, reason: impl Into<String>) -> Self {
        StoreError::InvalidRecord {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_found_message() {
        let err = StoreError::MultipleRecordsFound {
            schema: "Person".into(),
            count: 2,
        };
        assert_eq!(err.code(), "SNATCH_STORE_MULTIPLE_RECORDS_FOUND");
        assert_eq!(
            err.to_string(),
            "2 'Person' records match the filter; expected exactly one"
        );
    }
}
