//! API response types
//!
//! `{"status":"ok","data":..}` on success,
//! `{"status":"error","code":..,"message":..}` on failure.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::SnatchError;

/// Success response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    pub data: Value,
}

impl SuccessResponse {
    pub fn new(data: Value) -> Self {
        Self {
            status: "ok".to_string(),
            data,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({"status": self.status, "data": self.data})
    }
}

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &SnatchError) -> Self {
        Self::new(err.code(), err.to_string())
    }

    pub fn to_value(&self) -> Value {
        json!({"status": self.status, "code": self.code, "message": self.message})
    }
}

/// Unified response type
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl Response {
    pub fn success(data: Value) -> Self {
        Response::Success(SuccessResponse::new(data))
    }

    pub fn error(err: &SnatchError) -> Self {
        Response::Error(ErrorResponse::from_error(err))
    }

    pub fn from_result<T: Into<Value>>(result: Result<T, SnatchError>) -> Self {
        match result {
            Ok(data) => Self::success(data.into()),
            Err(e) => Self::error(&e),
        }
    }

    /// Single-line JSON text
    pub fn to_json(&self) -> String {
        match self {
            Response::Success(r) => r.to_value().to_string(),
            Response::Error(r) => r.to_value().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }
}
