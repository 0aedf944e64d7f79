//! CLI module for snatch
//!
//! Provides command-line access to:
//! - filter: compile a filter expression
//! - order: compile an order expression
//! - plan: build a relation plan
//! - render: fetch and render records from a fixture
//! - count: count matching records in a fixture

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Fetch, Target};
pub use commands::{execute, load_config, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_error, write_json, write_response};
