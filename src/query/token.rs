//! Parsed query tokens
//!
//! The bracket parser produces a tree of [`QueryToken`]s; the compiler
//! reduces it to a [`Predicate`](super::Predicate).

use std::fmt;

use serde::Serialize;

use super::errors::{QueryError, QueryResult};
use super::operators::Operator;

/// Boolean connective of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    And,
    Or,
    Not,
}

impl Connective {
    /// Matches a reserved keyword exactly (`and`, `or`, `not`)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "and" => Some(Connective::And),
            "or" => Some(Connective::Or),
            "not" => Some(Connective::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
            Connective::Not => "not",
        }
    }
}

/// Literal operand as written in the query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Scalar(String),
    /// Bracketed value list, e.g. `(1,2,3)`
    List(Vec<String>),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Scalar(value) => write!(f, "{}", value),
            RawValue::List(values) => write!(f, "({})", values.join(",")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryToken {
    Leaf {
        path: Vec<String>,
        operator: String,
        value: RawValue,
    },
    Group {
        connective: Connective,
        children: Vec<QueryToken>,
    },
}

impl QueryToken {
    pub fn leaf(path: &[&str], operator: &str, value: RawValue) -> Self {
        QueryToken::Leaf {
            path: path.iter().map(|s| s.to_string()).collect(),
            operator: operator.to_string(),
            value,
        }
    }

    pub fn group(connective: Connective, children: Vec<QueryToken>) -> Self {
        QueryToken::Group {
            connective,
            children,
        }
    }
}

/// One `path.asc` / `path.desc` entry of an order string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderToken {
    pub path: Vec<String>,
    pub operator: String,
}

/// Classification of one comma-separated piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Empty,
    Connective(Connective),
    Leaf {
        path: Vec<String>,
        operator: String,
        value: String,
    },
}

impl Piece {
    /// Splits `a.b.op.value` on the first segment naming a filter operator.
    ///
    /// The operator must be followed by a value segment (possibly empty, as
    /// in `id.in.` before a value list). Pieces without a registered operator
    /// keep their second-to-last segment as the presumed operator so that
    /// the converter can report it.
    ///
    /// The scan is leftmost from the second segment, so a nested attribute
    /// named like a filter operator (`day`, `month`, `year`, `in`, `is`,
    /// `like`, ...) is read as the operator: `event.day.eq.3` is `event`
    /// with operator `day` and value `eq.3`. Only a first segment may
    /// carry such a name.
    pub(crate) fn classify(piece: &str, input: &str) -> QueryResult<Piece> {
        let piece = piece.trim();
        if piece.is_empty() {
            return Ok(Piece::Empty);
        }
        if let Some(connective) = Connective::from_keyword(piece) {
            return Ok(Piece::Connective(connective));
        }

        let segments: Vec<&str> = piece.split('.').collect();
        if segments.len() < 3 {
            return Err(QueryError::malformed(piece, input));
        }

        let split = (1..segments.len() - 1)
            .find(|&i| Operator::from_token(segments[i]).map_or(false, |op| op.is_filter()))
            .unwrap_or(segments.len() - 2);

        let path = &segments[..split];
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(QueryError::malformed(piece, input));
        }

        Ok(Piece::Leaf {
            path: path.iter().map(|s| s.to_string()).collect(),
            operator: segments[split].to_string(),
            value: segments[split + 1..].join("."),
        })
    }
}
