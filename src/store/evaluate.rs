//! Predicate evaluation over JSON values
//!
//! A comparison holds if ANY value reached through its path satisfies it
//! (paths through to-many relations reach several values). `neq` and NOT
//! negate that outcome.
//!
//! No implicit coercion beyond numeric equality: `1` and `1.0` are equal,
//! `"1"` and `1` are not.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{date_part, Comparison, Predicate, SemanticOp};

/// Evaluates `predicate`; `lookup` returns the values reached by a path
pub fn evaluate<F>(predicate: &Predicate, lookup: &F) -> bool
where
    F: Fn(&[String]) -> Vec<Value>,
{
    match predicate {
        Predicate::Compare(comparison) => {
            let values = lookup(&comparison.path);
            let hit = matches_any(comparison, &values);
            hit != comparison.negated
        }
        Predicate::And(children) => children.iter().all(|child| evaluate(child, lookup)),
        Predicate::Or(children) => children.iter().any(|child| evaluate(child, lookup)),
        Predicate::Not(inner) => !evaluate(inner, lookup),
    }
}

fn matches_any(comparison: &Comparison, values: &[Value]) -> bool {
    match comparison.op {
        SemanticOp::IsNull => values.is_empty() || values.iter().any(Value::is_null),
        SemanticOp::IsNotNull => values.iter().any(|value| !value.is_null()),
        op => values
            .iter()
            .any(|actual| compare(op, actual, &comparison.value)),
    }
}

/// Applies one semantic operation to a single value
pub fn compare(op: SemanticOp, actual: &Value, expected: &Value) -> bool {
    match op {
        SemanticOp::Exact => loose_eq(actual, expected),
        SemanticOp::Gt => ordering(actual, expected) == Some(Ordering::Greater),
        SemanticOp::Gte => matches!(
            ordering(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        SemanticOp::Lt => ordering(actual, expected) == Some(Ordering::Less),
        SemanticOp::Lte => matches!(
            ordering(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        SemanticOp::Contains => text_match(actual, expected, |a, e| a.contains(e)),
        SemanticOp::StartsWith => text_match(actual, expected, |a, e| a.starts_with(e)),
        SemanticOp::EndsWith => text_match(actual, expected, |a, e| a.ends_with(e)),
        SemanticOp::In => expected
            .as_array()
            .map_or(false, |set| set.iter().any(|item| loose_eq(actual, item))),
        SemanticOp::Range => match expected.as_array().map(Vec::as_slice) {
            Some([low, high]) => {
                matches!(ordering(actual, low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(ordering(actual, high), Some(Ordering::Less | Ordering::Equal))
            }
            _ => false,
        },
        SemanticOp::Overlap => {
            let set = match expected.as_array() {
                Some(set) => set,
                None => return false,
            };
            match actual {
                Value::Array(items) => items
                    .iter()
                    .any(|item| set.iter().any(|wanted| loose_eq(item, wanted))),
                scalar => set.iter().any(|wanted| loose_eq(scalar, wanted)),
            }
        }
        SemanticOp::Year | SemanticOp::Month | SemanticOp::Day => {
            match (actual.as_str().and_then(|text| date_part(text, op)), expected.as_i64()) {
                (Some(part), Some(wanted)) => part == wanted,
                _ => false,
            }
        }
        SemanticOp::IsNull => actual.is_null(),
        SemanticOp::IsNotNull => !actual.is_null(),
    }
}

/// Equality with numbers compared by value
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Ordering of two values of the same kind; `None` across kinds
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn text_match(actual: &Value, expected: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), expected.as_str()) {
        (Some(actual), Some(expected)) => test(actual, expected),
        _ => false,
    }
}
