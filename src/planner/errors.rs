//! Relation planner errors
//!
//! Error codes:
//! - SNATCH_PLAN_DEPTH_OUT_OF_RANGE (REJECT)
//! - SNATCH_PLAN_UNKNOWN_SCHEMA (REJECT)

use thiserror::Error;

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Requested depth is not in `1..=ceiling`
    #[error("Depth {requested} is out of range: expected 1..={ceiling}")]
    DepthOutOfRange { requested: i64, ceiling: u32 },

    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),
}

impl PlannerError {
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::DepthOutOfRange { .. } => "SNATCH_PLAN_DEPTH_OUT_OF_RANGE",
            PlannerError::UnknownSchema(_) => "SNATCH_PLAN_UNKNOWN_SCHEMA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_message() {
        let err = PlannerError::DepthOutOfRange {
            requested: 0,
            ceiling: 3,
        };
        assert_eq!(err.code(), "SNATCH_PLAN_DEPTH_OUT_OF_RANGE");
        assert_eq!(err.to_string(), "Depth 0 is out of range: expected 1..=3");
    }
}
