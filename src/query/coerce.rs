//! Literal typing
//!
//! Converts raw literal text into a JSON value using the scalar type of the
//! attribute it is compared against.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

use crate::schema::ScalarType;

use super::errors::{QueryError, QueryResult};
use super::operators::SemanticOp;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Converts `text` to the JSON value of `ty`.
///
/// `attribute` is only used for the error message.
pub fn coerce(text: &str, ty: ScalarType, attribute: &str) -> QueryResult<Value> {
    let invalid = || QueryError::InvalidValue {
        attribute: attribute.to_string(),
        value: text.to_string(),
        expected: ty.type_name().to_string(),
    };

    match ty {
        ScalarType::String => Ok(Value::String(text.to_string())),
        ScalarType::Int => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        ScalarType::Float => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        ScalarType::Bool => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        ScalarType::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(|_| Value::String(text.to_string()))
            .map_err(|_| invalid()),
        ScalarType::DateTime => {
            if parse_datetime(text).is_some() {
                Ok(Value::String(text.to_string()))
            } else {
                Err(invalid())
            }
        }
        ScalarType::Any => Ok(guess(text)),
    }
}

/// Types a literal compared through `op`.
///
/// Date-part operators always take an integer; text matches never convert.
pub fn coerce_for(op: SemanticOp, text: &str, ty: ScalarType, attribute: &str) -> QueryResult<Value> {
    if op.is_date_part() {
        if !ty.has_date_parts() {
            return Err(QueryError::InvalidValue {
                attribute: attribute.to_string(),
                value: text.to_string(),
                expected: format!("a date attribute for '{}', found {}", op.as_str(), ty.type_name()),
            });
        }
        return coerce(text, ScalarType::Int, attribute);
    }
    if op.is_text_match() {
        return Ok(Value::String(text.to_string()));
    }
    coerce(text, ty, attribute)
}

/// Extracts the year, month or day of a date or datetime string
pub fn date_part(text: &str, op: SemanticOp) -> Option<i64> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(text).map(|dt| dt.date()))?;

    match op {
        SemanticOp::Year => Some(i64::from(date.year())),
        SemanticOp::Month => Some(i64::from(date.month())),
        SemanticOp::Day => Some(i64::from(date.day())),
        _ => None,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Untyped literals: booleans, then integers, then floats, else text
fn guess(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
        if text.chars().any(|c| c.is_ascii_digit()) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}
