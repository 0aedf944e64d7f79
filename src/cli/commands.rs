//! CLI command implementations
//!
//! Every command follows the same sequence:
//! 1. Load configuration (defaults when `--config` is omitted)
//! 2. Load the schema graph from `--schemas`
//! 3. Run the command and write one response line to stdout
//!
//! Query, plan and store rejections become `{"status":"error",..}`
//! responses. Configuration, schema and I/O failures are fatal [`CliError`]s.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::api::{QueryParams, Response, Snatch, SnatchError, SnatchResult};
use crate::config::SnatchConfig;
use crate::observability::Logger;
use crate::planner::plan_relations;
use crate::query::{compile_order, parse_and_compile};
use crate::schema::{SchemaGraph, SchemaLoader};
use crate::store::MemoryStore;

use super::args::{Cli, Command, Fetch};
use super::errors::CliResult;
use super::io::{read_document, write_response};

/// Parse arguments and run the command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run a parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    Logger::set_level(config.log_level);

    let response = execute(&cli.command, &config)?;
    write_response(&response)
}

/// Configuration from `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> CliResult<SnatchConfig> {
    match path {
        Some(path) => Ok(SnatchConfig::load(path)?),
        None => Ok(SnatchConfig::default()),
    }
}

/// Runs a command and returns the response to print
pub fn execute(command: &Command, config: &SnatchConfig) -> CliResult<Response> {
    let target = command.target();
    let graph = Arc::new(SchemaLoader::new(&target.schemas).load()?);
    let entity = target.entity.as_str();

    let result: SnatchResult<Value> = match command {
        Command::Filter { query, .. } => match parse_and_compile(query, entity, &graph) {
            Ok(predicate) => Ok(json!({
                "predicate": serde_json::to_value(&predicate)?,
                "display": predicate.to_string(),
            })),
            Err(e) => Err(SnatchError::from(e)),
        },

        Command::Order { order, .. } => match compile_order(order, entity, &graph) {
            Ok(keys) => Ok(json!({
                "keys": serde_json::to_value(&keys)?,
                "display": keys.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })),
            Err(e) => Err(SnatchError::from(e)),
        },

        Command::Plan { max_level, .. } => {
            let depth = max_level.unwrap_or_else(|| i64::from(config.default_max_level));
            match plan_relations(entity, &graph, depth, config.max_level_ceiling) {
                Ok(plan) => Ok(serde_json::to_value(&plan)?),
                Err(e) => Err(SnatchError::from(e)),
            }
        }

        Command::Render {
            fetch,
            order,
            limit,
            offset,
            distinct,
            max_level,
            single,
            ..
        } => {
            let snatch = open(graph, fetch, config)?;
            let mut raw = request_params(fetch);
            if let Some(order) = order {
                raw.insert("order".to_string(), order.clone());
            }
            if let Some(limit) = limit {
                raw.insert("limit".to_string(), limit.to_string());
            }
            if let Some(max_level) = max_level {
                raw.insert("max_level".to_string(), max_level.to_string());
            }
            raw.insert("offset".to_string(), offset.to_string());
            raw.insert("distinct".to_string(), distinct.to_string());

            QueryParams::parse(&raw, config).and_then(|params| {
                if *single {
                    snatch.retrieve(entity, &params)
                } else {
                    snatch.list(entity, &params).map(Value::from)
                }
            })
        }

        Command::Count { fetch, .. } => {
            let snatch = open(graph, fetch, config)?;
            QueryParams::parse(&request_params(fetch), config)
                .and_then(|params| snatch.size(entity, &params))
                .map(Value::from)
        }
    };

    Ok(Response::from_result(result))
}

/// Facade over the fixture named by `--data` (or stdin)
fn open(graph: Arc<SchemaGraph>, fetch: &Fetch, config: &SnatchConfig) -> CliResult<Snatch<MemoryStore>> {
    let fixture = read_document(fetch.data.as_deref())?;
    let store = MemoryStore::from_fixture(graph.clone(), &fixture)?;
    Ok(Snatch::new(graph, store, config.clone()))
}

fn request_params(fetch: &Fetch) -> HashMap<String, String> {
    let mut raw = HashMap::new();
    if let Some(query) = &fetch.query {
        raw.insert("query".to_string(), query.clone());
    }
    raw
}
