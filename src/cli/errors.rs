//! CLI-specific error types

use std::fmt;
use std::io;

use crate::iet::IetError;
use crate::plan_cache::PlanCacheError;
use crate::query::QueryError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// An argument is not valid JSON or not a valid query
    BadInput,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AERO_CLI_CONFIG_ERROR",
            Self::IoError => "AERO_CLI_IO_ERROR",
            Self::BadInput => "AERO_CLI_BAD_INPUT",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Bad argument
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadInput, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        Self::bad_input(e.to_string())
    }
}

impl From<IetError> for CliError {
    fn from(e: IetError) -> Self {
        Self::bad_input(e.to_string())
    }
}

impl From<PlanCacheError> for CliError {
    fn from(e: PlanCacheError) -> Self {
        Self::config_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CliError::bad_input("x").code_str(), "AERO_CLI_BAD_INPUT");
        assert_eq!(CliError::config_error("x").code_str(), "AERO_CLI_CONFIG_ERROR");
        assert_eq!(CliError::io_error("x").code(), &CliErrorCode::IoError);
    }

    #[test]
    fn test_conversions() {
        let e: CliError = QueryError::bad_value("nope").into();
        assert_eq!(e.code(), &CliErrorCode::BadInput);
        assert!(e.message().contains("nope"));

        let e: CliError = PlanCacheError::bad_config("max_entries must be > 0").into();
        assert_eq!(e.code(), &CliErrorCode::ConfigError);
        assert!(e.to_string().starts_with("AERO_CLI_CONFIG_ERROR: "));
    }
}
