//! Query language engine
//!
//! Compiles the compact filter syntax into a [`Predicate`]:
//!
//! ```text
//! and(name.eq.John,age.gt.18)
//! or(status.eq.active,status.eq.pending)
//! owner.email.like.*@example.com
//! id.in.(1,2,3)
//! not(born.year.1990)
//! ```
//!
//! and order strings into [`OrderKey`]s (`owner.name.desc,pk`).
//!
//! Pipeline: bracket parser, operator registry, path validator, value
//! coercion, predicate compiler. Every stage is a pure function of its
//! input and the read-only schema graph.

mod brackets;
mod cache;
mod coerce;
mod compiler;
mod errors;
mod operators;
mod predicate;
mod token;
mod validator;

pub use brackets::{parse, parse_order, validate_brackets};
pub use cache::{CacheStats, QueryCache, QueryKind};
pub use coerce::{coerce, date_part};
pub use compiler::{compile, compile_order_keys};
pub use errors::{QueryError, QueryResult};
pub use operators::{convert, order_direction, Conversion, Operand, Operator, SemanticOp};
pub use predicate::{Comparison, OrderKey, Predicate};
pub use token::{Connective, OrderToken, QueryToken, RawValue};
pub use validator::{validate, ResolvedPath, PK_ALIAS};

use crate::observability::{Logger, Severity};
use crate::schema::SchemaGraph;

/// Parses and compiles a filter string against the named schema
pub fn parse_and_compile(filter: &str, schema: &str, graph: &SchemaGraph) -> QueryResult<Predicate> {
    let root = graph
        .get(schema)
        .ok_or_else(|| QueryError::UnknownSchema(schema.to_string()))?;
    let tokens = parse(filter)?;
    let predicate = compile(&tokens, root.id(), graph)?;

    if Logger::enabled(Severity::Trace) {
        let compiled = predicate.to_string();
        Logger::trace(
            "QUERY_COMPILED",
            &[("schema", schema), ("query", filter), ("predicate", compiled.as_str())],
        );
    }
    Ok(predicate)
}

/// Parses and compiles an order string against the named schema
pub fn compile_order(order: &str, schema: &str, graph: &SchemaGraph) -> QueryResult<Vec<OrderKey>> {
    let root = graph
        .get(schema)
        .ok_or_else(|| QueryError::UnknownSchema(schema.to_string()))?;
    let tokens = parse_order(order)?;
    let keys = compile_order_keys(&tokens, root.id(), graph)?;

    if Logger::enabled(Severity::Trace) {
        let compiled = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(",");
        Logger::trace(
            "ORDER_COMPILED",
            &[("schema", schema), ("order", order), ("keys", compiled.as_str())],
        );
    }
    Ok(keys)
}
