//! JSON I/O handling for CLI
//!
//! - Input: JSON documents passed as arguments
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Parse a JSON argument, naming it in the error.
pub fn parse_json_arg(name: &str, text: &str) -> CliResult<Value> {
    serde_json::from_str(text)
        .map_err(|e| CliError::bad_input(format!("--{} is not valid JSON: {}", name, e)))
}

/// Parse an optional JSON argument.
pub fn parse_optional_json_arg(name: &str, text: Option<&str>) -> CliResult<Option<Value>> {
    text.map(|t| parse_json_arg(name, t)).transpose()
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg("filter", r#"{"a": 1}"#).unwrap()["a"], 1);
        let err = parse_json_arg("filter", "{a: 1}").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::BadInput);
        assert!(err.message().starts_with("--filter"));
    }

    #[test]
    fn test_parse_optional_json_arg() {
        assert!(parse_optional_json_arg("sort", None).unwrap().is_none());
        assert!(parse_optional_json_arg("sort", Some("{}")).unwrap().is_some());
    }
}
