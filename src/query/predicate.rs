//! Compiled predicate tree
//!
//! Immutable once built. The record store executes it; this crate only
//! constructs it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operators::SemanticOp;

/// Single-attribute comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Validated path, `pk` already resolved
    pub path: Vec<String>,
    pub op: SemanticOp,
    pub value: Value,
    /// Inequality of `neq`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

impl Comparison {
    pub fn new(path: &[&str], op: SemanticOp, value: Value) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            op,
            value,
            negated: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Boolean expression over comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    Compare(Comparison),
    /// Conjunction; empty matches everything
    And(Vec<Predicate>),
    /// Disjunction; empty matches nothing
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Predicate matching every record
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::And(children) if children.is_empty())
    }

    /// Conjunction of `children`, flattening nested conjunctions.
    ///
    /// A single child is returned as is.
    pub fn and(children: Vec<Predicate>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Predicate::And(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        Predicate::And(flat)
    }

    /// Disjunction of `children`, flattening nested disjunctions
    pub fn or(children: Vec<Predicate>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Predicate::Or(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return only;
            }
        }
        Predicate::Or(flat)
    }

    pub fn negate(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// Every comparison in the tree, left to right
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Predicate::Compare(comparison) => out.push(comparison),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_comparisons(out);
                }
            }
            Predicate::Not(inner) => inner.collect_comparisons(out),
        }
    }

    /// Distinct dot-joined paths referenced by the tree, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.comparisons().iter().map(|c| c.dotted()).collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = if self.negated { "not " } else { "" };
        match self.op {
            SemanticOp::IsNull | SemanticOp::IsNotNull => {
                write!(f, "{} {}{}", self.dotted(), not, self.op.as_str())
            }
            _ => write!(f, "{} {}{} {}", self.dotted(), not, self.op.as_str(), self.value),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare(comparison) => write!(f, "{}", comparison),
            Predicate::And(children) => write_group(f, "AND", children),
            Predicate::Or(children) => write_group(f, "OR", children),
            Predicate::Not(inner) => write!(f, "NOT({})", inner),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, name: &str, children: &[Predicate]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

/// Sort key compiled from an order string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    pub path: Vec<String>,
    pub descending: bool,
}

impl OrderKey {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.dotted())
        } else {
            write!(f, "{}", self.dotted())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eq(path: &str, value: Value) -> Predicate {
        Predicate::Compare(Comparison::new(&[path], SemanticOp::Exact, value))
    }

    #[test]
    fn test_and_flattens_and_collapses() {
        let nested = Predicate::and(vec![
            eq("a", json!(1)),
            Predicate::And(vec![eq("b", json!(2)), eq("c", json!(3))]),
        ]);
        assert_eq!(
            nested,
            Predicate::And(vec![eq("a", json!(1)), eq("b", json!(2)), eq("c", json!(3))])
        );
        assert_eq!(Predicate::and(vec![eq("a", json!(1))]), eq("a", json!(1)));
    }

    #[test]
    fn test_or_keeps_nested_and() {
        let p = Predicate::or(vec![
            Predicate::Or(vec![eq("a", json!(1)), eq("b", json!(2))]),
            Predicate::And(vec![eq("c", json!(3)), eq("d", json!(4))]),
        ]);
        match p {
            Predicate::Or(children) => {
                assert_eq!(children.len(), 3);
                assert!(matches!(children[2], Predicate::And(_)));
            }
            other => panic!("expected OR, got {}", other),
        }
    }

    #[test]
    fn test_display() {
        let p = Predicate::and(vec![
            eq("name", json!("John")),
            Predicate::Compare(Comparison::new(&["age"], SemanticOp::Gt, json!(18))),
            Predicate::negate(Predicate::Compare(Comparison::new(
                &["owner", "email"],
                SemanticOp::IsNull,
                Value::Null,
            ))),
        ]);
        assert_eq!(
            p.to_string(),
            "AND(name exact \"John\", age gt 18, NOT(owner.email is_null))"
        );
        let neq = Comparison::new(&["a"], SemanticOp::Exact, json!(1)).negated();
        assert_eq!(neq.to_string(), "a not exact 1");
    }

    #[test]
    fn test_serialization_shape() {
        let p = Predicate::and(vec![eq("a", json!(1)), eq("b", json!("x"))]);
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(
            value,
            json!({"and": [
                {"compare": {"path": ["a"], "op": "exact", "value": 1}},
                {"compare": {"path": ["b"], "op": "exact", "value": "x"}}
            ]})
        );
        let back: Predicate = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_paths_are_distinct() {
        let p = Predicate::or(vec![eq("status", json!("a")), eq("status", json!("b"))]);
        assert_eq!(p.paths(), vec!["status"]);
    }

    #[test]
    fn test_order_key_display() {
        let key = OrderKey {
            path: vec!["owner".into(), "name".into()],
            descending: true,
        };
        assert_eq!(key.to_string(), "-owner.name");
    }
}
