//! Facade error types
//!
//! Facade errors pass subsystem errors through unchanged: the code and
//! message of a query, planner, store or schema error reach the client as
//! they were raised. `status_code()` maps each onto an HTTP-style status.

use thiserror::Error;

use crate::config::ConfigError;
use crate::planner::PlannerError;
use crate::query::QueryError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for facade operations
pub type SnatchResult<T> = Result<T, SnatchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnatchError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request parameter that is present but unusable
    #[error("Invalid value '{value}' for parameter '{param}'")]
    InvalidParam { param: String, value: String },
}

impl SnatchError {
    pub fn invalid_param(param: &str, value: &str) -> Self {
        SnatchError::InvalidParam {
            param: param.to_string(),
            value: value.to_string(),
        }
    }

    /// Stable error code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            SnatchError::Query(e) => e.code(),
            SnatchError::Planner(e) => e.code(),
            SnatchError::Store(e) => e.code(),
            SnatchError::Schema(e) => e.code(),
            SnatchError::Config(e) => e.code(),
            SnatchError::InvalidParam { .. } => "SNATCH_INVALID_PARAM",
        }
    }

    /// Client-facing status: 400 bad input, 404 missing, 500 server side
    pub fn status_code(&self) -> u16 {
        match self {
            SnatchError::Query(QueryError::UnknownSchema(_)) => 404,
            SnatchError::Query(_) => 400,

            SnatchError::Planner(PlannerError::UnknownSchema(_)) => 404,
            SnatchError::Planner(PlannerError::DepthOutOfRange { .. }) => 400,

            SnatchError::Store(StoreError::RecordNotFound { .. }) => 404,
            SnatchError::Store(StoreError::UnknownSchema(_)) => 404,
            SnatchError::Store(StoreError::NoFilterProvided { .. }) => 400,
            SnatchError::Store(StoreError::MultipleRecordsFound { .. }) => 400,
            SnatchError::Store(StoreError::InvalidRecord { .. }) => 500,

            SnatchError::InvalidParam { .. } => 400,

            SnatchError::Schema(_) => 500,
            SnatchError::Config(_) => 500,
        }
    }
}
