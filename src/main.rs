//! snatch CLI entry point
//!
//! A minimal entrypoint that:
//! 1. Parses CLI arguments and dispatches (via cli::run)
//! 2. Writes fatal errors as an error response
//! 3. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use snatch::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::write_error(e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
