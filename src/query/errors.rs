//! Query language errors
//!
//! Every error is terminal for the call that raised it and names the
//! offending token, segment or schema so it can be shown to the client as is.

use thiserror::Error;

/// Result type for query parsing and compilation
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Empty input, or parentheses unbalanced / closed before opened
    #[error("Invalid bracket sequence in '{0}'")]
    BracketImbalance(String),

    /// A piece that is neither a leaf, a connective, nor a bracket opener
    #[error("Malformed token '{token}' in '{input}'")]
    MalformedToken { token: String, input: String },

    #[error("Attribute '{attribute}' does not exist on schema '{schema}'")]
    UnknownAttribute { attribute: String, schema: String },

    /// A scalar attribute used as an intermediate path segment
    #[error("Attribute '{attribute}' on schema '{schema}' is a terminal field and cannot be traversed")]
    NonTerminalLeafAttribute { attribute: String, schema: String },

    #[error("Unknown operator '{operator}' (value '{value}')")]
    UnknownOperator { operator: String, value: String },

    /// Operator applied to a value shape it does not accept
    #[error("Operator '{operator}' cannot take '{value}': {reason}")]
    InvalidOperand {
        operator: String,
        value: String,
        reason: String,
    },

    /// Literal that does not convert to the attribute's type
    #[error("Invalid value '{value}' for attribute '{attribute}': expected {expected}")]
    InvalidValue {
        attribute: String,
        value: String,
        expected: String,
    },

    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),
}

impl QueryError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::BracketImbalance(_) => "SNATCH_QUERY_BRACKET_IMBALANCE",
            QueryError::MalformedToken { .. } => "SNATCH_QUERY_MALFORMED_TOKEN",
            QueryError::UnknownAttribute { .. } => "SNATCH_QUERY_UNKNOWN_ATTRIBUTE",
            QueryError::NonTerminalLeafAttribute { .. } => "SNATCH_QUERY_NON_TERMINAL_LEAF_ATTRIBUTE",
            QueryError::UnknownOperator { .. } => "SNATCH_QUERY_UNKNOWN_OPERATOR",
            QueryError::InvalidOperand { .. } => "SNATCH_QUERY_INVALID_OPERAND",
            QueryError::InvalidValue { .. } => "SNATCH_QUERY_INVALID_VALUE",
            QueryError::UnknownSchema(_) => "SNATCH_QUERY_UNKNOWN_SCHEMA",
        }
    }

    pub(crate) fn malformed(token: &str, input: &str) -> Self {
        QueryError::MalformedToken {
            token: token.to_string(),
            input: input.to_string(),
        }
    }
}
