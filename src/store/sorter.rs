//! Row sorting by compiled order keys
//!
//! Sort is stable and deterministic. Keys are compared left to right; a
//! descending key reverses only its own comparison.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::OrderKey;

/// Sorts rows by order keys
pub struct RowSorter;

impl RowSorter {
    /// Sorts `rows`; `lookup` returns the sort value of a row for a path
    pub fn sort<F>(rows: Vec<Value>, keys: &[OrderKey], lookup: F) -> Vec<Value>
    where
        F: Fn(&Value, &[String]) -> Option<Value>,
    {
        if keys.is_empty() {
            return rows;
        }

        let mut decorated: Vec<(Vec<Option<Value>>, Value)> = rows
            .into_iter()
            .map(|row| {
                let sort_values = keys.iter().map(|key| lookup(&row, key.path.as_slice())).collect();
                (sort_values, row)
            })
            .collect();

        decorated.sort_by(|(a, _), (b, _)| {
            for (index, key) in keys.iter().enumerate() {
                let ordering = Self::compare_values(a[index].as_ref(), b[index].as_ref());
                let ordering = if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        decorated.into_iter().map(|(_, row)| row).collect()
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string
    /// - For same types, natural ordering
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                    (Value::Number(a_n), Value::Number(b_n)) => {
                        let a_f = a_n.as_f64().unwrap_or(0.0);
                        let b_f = b_n.as_f64().unwrap_or(0.0);
                        a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                    // Arrays and objects keep their relative order
                    _ => Ordering::Equal,
                }
            }
        }
    }
}
