//! Observability for snatch
//!
//! Structured JSON-line logging and request-scoped lifecycle events.
//! Observability is read-only: nothing logged here changes a result.
//!
//! ```ignore
//! use snatch::observability::{Logger, ObservationScope};
//!
//! Logger::info("SCHEMA_GRAPH_LOADED", &[("schemas", "4")]);
//!
//! let scope = ObservationScope::with_fields("SNATCH_LIST", &[("entity", "Person")]);
//! // ... do work ...
//! scope.complete();
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::ObservationScope;
