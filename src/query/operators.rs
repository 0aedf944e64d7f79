//! Operator registry and converters
//!
//! Maps an operator token to the semantic operation it denotes and
//! normalizes its raw operand. Typing of the operand happens later, once the
//! terminal attribute of the path is known.

use serde::{Deserialize, Serialize};

use super::errors::{QueryError, QueryResult};
use super::token::RawValue;

/// Operator tokens recognized by the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Is,
    In,
    Between,
    Ov,
    Year,
    Month,
    Day,
    Asc,
    Desc,
    And,
    Or,
    Not,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "eq" => Operator::Eq,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "like" => Operator::Like,
            "is" => Operator::Is,
            "in" => Operator::In,
            "between" => Operator::Between,
            "ov" => Operator::Ov,
            "year" => Operator::Year,
            "month" => Operator::Month,
            "day" => Operator::Day,
            "asc" => Operator::Asc,
            "desc" => Operator::Desc,
            "and" => Operator::And,
            "or" => Operator::Or,
            "not" => Operator::Not,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Like => "like",
            Operator::Is => "is",
            Operator::In => "in",
            Operator::Between => "between",
            Operator::Ov => "ov",
            Operator::Year => "year",
            Operator::Month => "month",
            Operator::Day => "day",
            Operator::Asc => "asc",
            Operator::Desc => "desc",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    /// True for operators that produce a comparison
    pub fn is_filter(&self) -> bool {
        !matches!(
            self,
            Operator::Asc | Operator::Desc | Operator::And | Operator::Or | Operator::Not
        )
    }

    /// True for operators whose operand is a bracketed value list
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::Between | Operator::Ov)
    }
}

/// Semantic comparison executed by the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticOp {
    Exact,
    IsNull,
    IsNotNull,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    Range,
    Overlap,
    Year,
    Month,
    Day,
}

impl SemanticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticOp::Exact => "exact",
            SemanticOp::IsNull => "is_null",
            SemanticOp::IsNotNull => "is_not_null",
            SemanticOp::Gt => "gt",
            SemanticOp::Gte => "gte",
            SemanticOp::Lt => "lt",
            SemanticOp::Lte => "lte",
            SemanticOp::Contains => "contains",
            SemanticOp::StartsWith => "starts_with",
            SemanticOp::EndsWith => "ends_with",
            SemanticOp::In => "in",
            SemanticOp::Range => "range",
            SemanticOp::Overlap => "overlap",
            SemanticOp::Year => "year",
            SemanticOp::Month => "month",
            SemanticOp::Day => "day",
        }
    }

    /// Date-part extraction operators
    pub fn is_date_part(&self) -> bool {
        matches!(self, SemanticOp::Year | SemanticOp::Month | SemanticOp::Day)
    }

    /// Operators whose operand is matched as raw text
    pub fn is_text_match(&self) -> bool {
        matches!(
            self,
            SemanticOp::Contains | SemanticOp::StartsWith | SemanticOp::EndsWith
        )
    }
}

/// Operand after conversion, before typing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Literal typed by the terminal attribute
    Text(String),
    /// Boolean literal of `is`
    Flag(bool),
    List(Vec<String>),
    /// Null checks carry no operand
    None,
}

/// Result of converting one operator token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub op: SemanticOp,
    pub operand: Operand,
    pub negate: bool,
}

impl Conversion {
    fn new(op: SemanticOp, operand: Operand) -> Self {
        Self {
            op,
            operand,
            negate: false,
        }
    }
}

/// Converts an operator token and its raw operand.
///
/// Fails with `UnknownOperator` for tokens that are not filter operators.
pub fn convert(operator: &str, raw: &RawValue) -> QueryResult<Conversion> {
    let op = Operator::from_token(operator)
        .filter(|op| op.is_filter())
        .ok_or_else(|| QueryError::UnknownOperator {
            operator: operator.to_string(),
            value: raw.to_string(),
        })?;

    match op {
        Operator::Eq => {
            let text = scalar(op, raw)?;
            if text == "null" {
                Ok(Conversion::new(SemanticOp::IsNull, Operand::None))
            } else {
                Ok(Conversion::new(SemanticOp::Exact, Operand::Text(text.to_string())))
            }
        }
        Operator::Neq => {
            let text = scalar(op, raw)?;
            if text == "null" {
                Ok(Conversion::new(SemanticOp::IsNotNull, Operand::None))
            } else {
                Ok(Conversion {
                    op: SemanticOp::Exact,
                    operand: Operand::Text(text.to_string()),
                    negate: true,
                })
            }
        }
        Operator::Gt => ordinal(SemanticOp::Gt, op, raw),
        Operator::Gte => ordinal(SemanticOp::Gte, op, raw),
        Operator::Lt => ordinal(SemanticOp::Lt, op, raw),
        Operator::Lte => ordinal(SemanticOp::Lte, op, raw),
        Operator::Year => ordinal(SemanticOp::Year, op, raw),
        Operator::Month => ordinal(SemanticOp::Month, op, raw),
        Operator::Day => ordinal(SemanticOp::Day, op, raw),
        Operator::Like => {
            let (sem, text) = like_pattern(scalar(op, raw)?);
            Ok(Conversion::new(sem, Operand::Text(text.to_string())))
        }
        Operator::Is => match scalar(op, raw)? {
            "true" => Ok(Conversion::new(SemanticOp::Exact, Operand::Flag(true))),
            "false" => Ok(Conversion::new(SemanticOp::Exact, Operand::Flag(false))),
            "null" => Ok(Conversion::new(SemanticOp::IsNull, Operand::None)),
            _ => Err(invalid_operand(op, raw, "expected true, false or null")),
        },
        Operator::In => Ok(Conversion::new(SemanticOp::In, Operand::List(list(raw)))),
        Operator::Ov => Ok(Conversion::new(SemanticOp::Overlap, Operand::List(list(raw)))),
        Operator::Between => match raw {
            RawValue::List(values) if values.len() == 2 => {
                Ok(Conversion::new(SemanticOp::Range, Operand::List(values.clone())))
            }
            _ => Err(invalid_operand(op, raw, "expected a list of exactly two values")),
        },
        Operator::Asc | Operator::Desc | Operator::And | Operator::Or | Operator::Not => {
            Err(QueryError::UnknownOperator {
                operator: operator.to_string(),
                value: raw.to_string(),
            })
        }
    }
}

/// Direction of an order operator: `Some(true)` for descending
pub fn order_direction(operator: &str) -> Option<bool> {
    match Operator::from_token(operator)? {
        Operator::Asc => Some(false),
        Operator::Desc => Some(true),
        _ => None,
    }
}

/// `*x*` contains, `*x` ends with, `x*` starts with, no wildcard is exact.
/// Inner wildcards fall back to a contains match on the whole text.
fn like_pattern(text: &str) -> (SemanticOp, &str) {
    let starts = text.starts_with('*');
    let ends = text.ends_with('*');
    if !text.contains('*') {
        (SemanticOp::Exact, text)
    } else if starts && ends && text.len() >= 2 {
        (SemanticOp::Contains, &text[1..text.len() - 1])
    } else if starts {
        (SemanticOp::EndsWith, &text[1..])
    } else if ends {
        (SemanticOp::StartsWith, &text[..text.len() - 1])
    } else {
        (SemanticOp::Contains, text)
    }
}

fn ordinal(sem: SemanticOp, op: Operator, raw: &RawValue) -> QueryResult<Conversion> {
    let text = scalar(op, raw)?;
    Ok(Conversion::new(sem, Operand::Text(text.to_string())))
}

fn scalar(op: Operator, raw: &RawValue) -> QueryResult<&str> {
    match raw {
        RawValue::Scalar(text) => Ok(text),
        RawValue::List(_) => Err(invalid_operand(op, raw, "expected a single value")),
    }
}

fn list(raw: &RawValue) -> Vec<String> {
    match raw {
        RawValue::Scalar(text) => vec![text.clone()],
        RawValue::List(values) => values.clone(),
    }
}

fn invalid_operand(op: Operator, raw: &RawValue, reason: &str) -> QueryError {
    QueryError::InvalidOperand {
        operator: op.as_str().to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> RawValue {
        RawValue::Scalar(value.to_string())
    }

    fn convert_text(op: &str, value: &str) -> Conversion {
        convert(op, &text(value)).unwrap()
    }

    #[test]
    fn test_eq_and_neq() {
        let eq = convert_text("eq", "John");
        assert_eq!(eq.op, SemanticOp::Exact);
        assert_eq!(eq.operand, Operand::Text("John".into()));
        assert!(!eq.negate);

        let neq = convert_text("neq", "John");
        assert_eq!(neq.op, SemanticOp::Exact);
        assert!(neq.negate);
    }

    #[test]
    fn test_null_literals() {
        assert_eq!(convert_text("eq", "null").op, SemanticOp::IsNull);
        let neq = convert_text("neq", "null");
        assert_eq!(neq.op, SemanticOp::IsNotNull);
        assert!(!neq.negate);
        assert_eq!(convert_text("is", "null").op, SemanticOp::IsNull);
    }

    #[test]
    fn test_like_wildcards() {
        let cases = [
            ("*oh*", SemanticOp::Contains, "oh"),
            ("oh*", SemanticOp::StartsWith, "oh"),
            ("*oh", SemanticOp::EndsWith, "oh"),
            ("oh", SemanticOp::Exact, "oh"),
            ("o*h", SemanticOp::Contains, "o*h"),
            ("*", SemanticOp::EndsWith, ""),
        ];
        for (input, op, value) in cases {
            let conversion = convert_text("like", input);
            assert_eq!(conversion.op, op, "input {}", input);
            assert_eq!(conversion.operand, Operand::Text(value.into()));
        }
    }

    #[test]
    fn test_is_flags() {
        assert_eq!(convert_text("is", "true").operand, Operand::Flag(true));
        assert_eq!(convert_text("is", "false").operand, Operand::Flag(false));
        assert!(matches!(
            convert("is", &text("maybe")),
            Err(QueryError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_in_wraps_scalar() {
        let conversion = convert_text("in", "7");
        assert_eq!(conversion.op, SemanticOp::In);
        assert_eq!(conversion.operand, Operand::List(vec!["7".into()]));
    }

    #[test]
    fn test_between_needs_two_values() {
        let ok = convert("between", &RawValue::List(vec!["1".into(), "5".into()])).unwrap();
        assert_eq!(ok.op, SemanticOp::Range);

        for raw in [
            RawValue::List(vec!["1".into()]),
            RawValue::List(vec!["1".into(), "2".into(), "3".into()]),
            text("1"),
        ] {
            assert!(matches!(
                convert("between", &raw),
                Err(QueryError::InvalidOperand { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_and_structural_operators() {
        for op in ["foo", "asc", "desc", "and", "not"] {
            assert!(matches!(
                convert(op, &text("1")),
                Err(QueryError::UnknownOperator { .. })
            ));
        }
    }

    #[test]
    fn test_scalar_operator_rejects_list() {
        assert!(matches!(
            convert("gt", &RawValue::List(vec!["1".into()])),
            Err(QueryError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_order_direction() {
        assert_eq!(order_direction("asc"), Some(false));
        assert_eq!(order_direction("desc"), Some(true));
        assert_eq!(order_direction("eq"), None);
    }
}
