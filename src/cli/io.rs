//! JSON I/O handling for CLI
//!
//! - Input: one JSON document, from a file or stdin
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use crate::api::Response;

use super::errors::{CliError, CliResult};

/// Read one JSON document from `path`, or from stdin when `None`
pub fn read_document(path: Option<&Path>) -> CliResult<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::data_error(format!("Failed to read '{}': {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(serde_json::from_str(&content)?)
}

/// Write a facade response to stdout
pub fn write_response(response: &Response) -> CliResult<()> {
    write_json(&response.to_json())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_json(&response.to_string())
}

/// Write a raw JSON string to stdout
pub fn write_json(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_document_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\n  \"Person\": [{{\"id\": 1}}]\n}}").unwrap();

        let value = read_document(Some(file.path())).unwrap();
        assert_eq!(value["Person"][0]["id"], 1);
    }

    #[test]
    fn test_read_document_rejects_empty_and_missing() {
        let file = NamedTempFile::new().unwrap();
        let err = read_document(Some(file.path())).unwrap_err();
        assert_eq!(err.code_str(), "SNATCH_CLI_IO_ERROR");

        let err = read_document(Some(Path::new("/nonexistent/data.json"))).unwrap_err();
        assert_eq!(err.code_str(), "SNATCH_CLI_DATA_ERROR");
    }
}
