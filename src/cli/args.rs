//! CLI argument definitions using clap
//!
//! Commands:
//! - snatch filter --entity <name> <query>
//! - snatch order --entity <name> <order>
//! - snatch plan --entity <name> [--max-level <n>]
//! - snatch render --entity <name> [--data <file>] [--query ..] [--order ..] ...
//! - snatch count --entity <name> [--data <file>] [--query ..]
//!
//! Every command takes `--schemas <dir>` (default `./schemas`) and the
//! global `--config <file>`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// snatch - relation-aware query language over a schema graph
#[derive(Parser, Debug)]
#[command(name = "snatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Schema directory and root entity shared by every command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Directory of `*.json` schema files
    #[arg(long, default_value = "./schemas")]
    pub schemas: PathBuf,

    /// Root schema name
    #[arg(long)]
    pub entity: String,
}

/// Record source and request parameters
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    /// Fixture file `{"Schema": [rows..]}`; read from stdin when omitted
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Filter expression
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a filter expression and print the predicate tree
    Filter {
        #[command(flatten)]
        target: Target,

        /// Filter expression, e.g. `name.eq.John,age.gt.18`
        query: String,
    },

    /// Compile an order expression and print the order keys
    Order {
        #[command(flatten)]
        target: Target,

        /// Order expression, e.g. `age.desc,name`
        order: String,
    },

    /// Print the relation plan for a depth
    Plan {
        #[command(flatten)]
        target: Target,

        /// Relation depth; the configured default when omitted
        #[arg(long, allow_negative_numbers = true)]
        max_level: Option<i64>,
    },

    /// Fetch records and render them with envelopes
    Render {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        fetch: Fetch,

        /// Order expression
        #[arg(long)]
        order: Option<String>,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Drop duplicate records
        #[arg(long)]
        distinct: bool,

        #[arg(long, allow_negative_numbers = true)]
        max_level: Option<i64>,

        /// Resolve exactly one record instead of a page
        #[arg(long)]
        single: bool,
    },

    /// Count matching records
    Count {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        fetch: Fetch,
    },
}

impl Command {
    pub fn target(&self) -> &Target {
        match self {
            Command::Filter { target, .. }
            | Command::Order { target, .. }
            | Command::Plan { target, .. }
            | Command::Render { target, .. }
            | Command::Count { target, .. } => target,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
