//! snatch - a relation-aware query language over a schema graph
//!
//! A filter string such as `name.eq.John,or(age.gt.18,pets.name.like.R*)`
//! is parsed, validated against the schema graph and compiled into a
//! [`query::Predicate`]. A depth budget becomes a [`planner::RelationPlan`]
//! that decides which relations are joined and which are fetched
//! separately, and [`render`] wraps every relation of a result in a
//! `{self, link}` envelope.
//!
//! The [`api::Snatch`] facade ties these together over any
//! [`store::RecordStore`].

pub mod api;
pub mod cli;
pub mod config;
pub mod observability;
pub mod planner;
pub mod query;
pub mod render;
pub mod schema;
pub mod store;
