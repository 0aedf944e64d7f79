//! Request parameter parsing
//!
//! Turns raw `key=value` request parameters into [`QueryParams`]:
//!
//! | key         | meaning                                | default              |
//! |-------------|----------------------------------------|----------------------|
//! | `query`     | filter expression                      | none (match all)     |
//! | `order`     | order expression                       | none                 |
//! | `limit`     | page size, `1..=MAX_LIMIT`             | `page_size`          |
//! | `offset`    | rows skipped                           | 0                    |
//! | `distinct`  | `true` / `false`                       | false                |
//! | `max_level` | relation depth                         | `default_max_level`  |
//!
//! Unknown keys are ignored. The depth range is checked by the planner.

use std::collections::HashMap;

use crate::config::SnatchConfig;

use super::errors::{SnatchError, SnatchResult};

/// Maximum number of records one page can return
pub const MAX_LIMIT: usize = 1000;

/// Parsed request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub query: Option<String>,
    pub order: Option<String>,
    pub limit: usize,
    pub offset: usize,
    pub distinct: bool,
    pub max_level: i64,
}

impl QueryParams {
    /// Parameters with every field at its configured default
    pub fn defaults(config: &SnatchConfig) -> Self {
        Self {
            query: None,
            order: None,
            limit: config.page_size,
            offset: 0,
            distinct: false,
            max_level: i64::from(config.default_max_level),
        }
    }

    /// Parse request parameters from a map
    pub fn parse(params: &HashMap<String, String>, config: &SnatchConfig) -> SnatchResult<Self> {
        let mut result = Self::defaults(config);

        for (key, value) in params {
            match key.as_str() {
                "query" => result.query = non_empty(value),
                "order" => result.order = non_empty(value),
                "limit" => result.limit = parse_limit(value)?,
                "offset" => result.offset = parse_number("offset", value)?,
                "distinct" => result.distinct = parse_flag(value)?,
                "max_level" => result.max_level = parse_number("max_level", value)?,
                _ => {}
            }
        }

        Ok(result)
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = non_empty(&query.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = non_empty(&order.into());
        self
    }

    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn with_max_level(mut self, max_level: i64) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(param: &str, value: &str) -> SnatchResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SnatchError::invalid_param(param, value))
}

fn parse_limit(value: &str) -> SnatchResult<usize> {
    let limit: usize = parse_number("limit", value)?;
    if limit == 0 || limit > MAX_LIMIT {
        return Err(SnatchError::invalid_param("limit", value));
    }
    Ok(limit)
}

fn parse_flag(value: &str) -> SnatchResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(SnatchError::invalid_param("distinct", value)),
    }
}
