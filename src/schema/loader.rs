//! Schema loader for building the graph from disk at startup
//!
//! - Every `*.json` file in the schema directory is read
//! - A file holds one schema definition or an array of them
//! - Files are read in name order so the graph is deterministic
//! - Missing or malformed files abort startup

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::errors::{SchemaError, SchemaResult};
use super::graph::{SchemaGraph, SchemaGraphBuilder};
use super::types::SchemaDef;
use crate::observability::Logger;

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    One(SchemaDef),
    Many(Vec<SchemaDef>),
}

/// Reads schema files from a directory into a [`SchemaGraph`]
pub struct SchemaLoader {
    schema_dir: PathBuf,
}

impl SchemaLoader {
    /// Creates a loader for the given directory.
    pub fn new(schema_dir: impl AsRef<Path>) -> Self {
        Self {
            schema_dir: schema_dir.as_ref().to_path_buf(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every schema file and resolves the graph.
    pub fn load(&self) -> SchemaResult<SchemaGraph> {
        let dir = self.schema_dir.display().to_string();

        let entries = fs::read_dir(&self.schema_dir)
            .map_err(|e| SchemaError::malformed(&dir, format!("Failed to read schema directory: {}", e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| SchemaError::malformed(&dir, format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut builder = SchemaGraphBuilder::default();
        for path in &paths {
            for def in Self::read_file(path)? {
                builder.add(def);
            }
        }

        let graph = builder.build()?;
        let files = paths.len().to_string();
        let schemas = graph.len().to_string();
        Logger::info(
            "SCHEMA_GRAPH_LOADED",
            &[("dir", dir.as_str()), ("files", files.as_str()), ("schemas", schemas.as_str())],
        );
        Ok(graph)
    }

    fn read_file(path: &Path) -> SchemaResult<Vec<SchemaDef>> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(&display, format!("Failed to read file: {}", e)))?;

        let file: SchemaFile = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed(&display, format!("Invalid JSON: {}", e)))?;

        Ok(match file {
            SchemaFile::One(def) => vec![def],
            SchemaFile::Many(defs) => defs,
        })
    }
}
