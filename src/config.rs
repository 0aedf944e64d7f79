//! snatch configuration
//!
//! Loaded from a JSON file. Every field is optional; missing fields take
//! the defaults below.
//!
//! ```json
//! {
//!   "page_size": 20,
//!   "default_max_level": 1,
//!   "max_level_ceiling": 3,
//!   "query_cache_capacity": 256,
//!   "link_prefix": "/api",
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Malformed(String),

    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Unreadable { .. } => "SNATCH_CONFIG_UNREADABLE",
            ConfigError::Malformed(_) => "SNATCH_CONFIG_MALFORMED",
            ConfigError::InvalidValue { .. } => "SNATCH_CONFIG_INVALID_VALUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnatchConfig {
    /// Rows per page when a request gives no limit
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Relation depth when a request gives no `max_level`
    #[serde(default = "default_max_level")]
    pub default_max_level: u32,

    /// Highest `max_level` a request may ask for
    #[serde(default = "default_max_level_ceiling")]
    pub max_level_ceiling: u32,

    /// Compiled queries kept in memory; 0 disables the cache
    #[serde(default = "default_query_cache_capacity")]
    pub query_cache_capacity: usize,

    /// Prefix of every envelope link
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,

    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_page_size() -> usize {
    20
}
fn default_max_level() -> u32 {
    1
}
fn default_max_level_ceiling() -> u32 {
    3
}
fn default_query_cache_capacity() -> usize {
    256
}
fn default_link_prefix() -> String {
    "/api".to_string()
}
fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for SnatchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_max_level: default_max_level(),
            max_level_ceiling: default_max_level_ceiling(),
            query_cache_capacity: default_query_cache_capacity(),
            link_prefix: default_link_prefix(),
            log_level: default_log_level(),
        }
    }
}

impl SnatchConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: SnatchConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be > 0".to_string(),
            });
        }

        if self.default_max_level > self.max_level_ceiling {
            return Err(ConfigError::InvalidValue {
                field: "default_max_level",
                reason: format!(
                    "{} exceeds max_level_ceiling {}",
                    self.default_max_level, self.max_level_ceiling
                ),
            });
        }

        if !self.link_prefix.is_empty() && !self.link_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "link_prefix",
                reason: format!("'{}' must start with '/'", self.link_prefix),
            });
        }

        Ok(())
    }
}
