//! Request facade for snatch
//!
//! [`Snatch`] ties the subsystems together behind three read operations:
//!
//! - `list`: one page of rendered entities plus the total match count
//! - `retrieve`: exactly one rendered entity
//! - `size`: number of matching entities
//!
//! # Design Principles
//!
//! - Error codes from lower subsystems are passed through unchanged
//! - Depth is checked before any query text is compiled
//! - No writes: the facade only reads through a [`crate::store::RecordStore`]

mod errors;
mod handler;
mod params;
mod response;

pub use errors::{SnatchError, SnatchResult};
pub use handler::{ListPage, Snatch};
pub use params::{QueryParams, MAX_LIMIT};
pub use response::{ErrorResponse, Response, SuccessResponse};
