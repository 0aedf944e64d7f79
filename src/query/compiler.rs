//! Predicate compiler
//!
//! Reduces a token tree to a [`Predicate`]. Compilation is all or nothing:
//! the first failing leaf aborts the whole call.

use serde_json::Value;

use crate::schema::{SchemaGraph, SchemaId};

use super::coerce::{coerce, coerce_for};
use super::errors::{QueryError, QueryResult};
use super::operators::{convert, order_direction, Operand};
use super::predicate::{Comparison, OrderKey, Predicate};
use super::token::{Connective, OrderToken, QueryToken, RawValue};
use super::validator::validate;

/// Compiles top-level tokens, implicitly joined with AND
pub fn compile(tokens: &[QueryToken], root: SchemaId, graph: &SchemaGraph) -> QueryResult<Predicate> {
    let children = compile_all(tokens, root, graph)?;
    Ok(Predicate::and(children))
}

fn compile_all(tokens: &[QueryToken], root: SchemaId, graph: &SchemaGraph) -> QueryResult<Vec<Predicate>> {
    tokens
        .iter()
        .map(|token| compile_token(token, root, graph))
        .collect()
}

fn compile_token(token: &QueryToken, root: SchemaId, graph: &SchemaGraph) -> QueryResult<Predicate> {
    match token {
        QueryToken::Leaf {
            path,
            operator,
            value,
        } => compile_leaf(path, operator, value, root, graph).map(Predicate::Compare),
        QueryToken::Group {
            connective,
            children,
        } => {
            let children = compile_all(children, root, graph)?;
            Ok(match connective {
                Connective::And => Predicate::and(children),
                Connective::Or => Predicate::or(children),
                // Children of NOT form one implicit AND, negated once
                Connective::Not => Predicate::negate(Predicate::and(children)),
            })
        }
    }
}

fn compile_leaf(
    path: &[String],
    operator: &str,
    raw: &RawValue,
    root: SchemaId,
    graph: &SchemaGraph,
) -> QueryResult<Comparison> {
    let resolved = validate(path, root, graph)?;
    let conversion = convert(operator, raw)?;
    let attribute = resolved.terminal();

    let value = match conversion.operand {
        Operand::Text(text) => coerce_for(conversion.op, &text, resolved.value_type, attribute)?,
        Operand::Flag(flag) => Value::Bool(flag),
        Operand::List(items) => Value::Array(
            items
                .iter()
                .map(|item| coerce(item, resolved.value_type, attribute))
                .collect::<QueryResult<Vec<_>>>()?,
        ),
        Operand::None => Value::Null,
    };

    Ok(Comparison {
        path: resolved.segments,
        op: conversion.op,
        value,
        negated: conversion.negate,
    })
}

/// Compiles order tokens into validated sort keys
pub fn compile_order_keys(
    tokens: &[OrderToken],
    root: SchemaId,
    graph: &SchemaGraph,
) -> QueryResult<Vec<OrderKey>> {
    tokens
        .iter()
        .map(|token| {
            let resolved = validate(&token.path, root, graph)?;
            let descending =
                order_direction(&token.operator).ok_or_else(|| QueryError::UnknownOperator {
                    operator: token.operator.clone(),
                    value: token.path.join("."),
                })?;
            Ok(OrderKey {
                path: resolved.segments,
                descending,
            })
        })
        .collect()
}
