//! # Command Errors
//!
//! Error types for the index filter administration commands.

use thiserror::Error;

use crate::query::QueryError;

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Index filter command errors. Every variant is a validation failure; no
/// state is changed when one is returned.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The command document is not an object
    #[error("Command must be an object")]
    NotAnObject,

    /// Required field absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field present with the wrong type or an invalid value
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Field that is only meaningful alongside `query`
    #[error("Field '{0}' requires a query")]
    RequiresQuery(&'static str),

    /// The query does not canonicalize
    #[error("{0}")]
    Query(#[from] QueryError),
}

impl CommandError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CommandError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::NotAnObject | CommandError::InvalidField { .. } => {
                "AERO_COMMAND_BAD_VALUE"
            }
            CommandError::MissingField(_) => "AERO_COMMAND_MISSING_FIELD",
            CommandError::RequiresQuery(_) => "AERO_COMMAND_REQUIRES_QUERY",
            CommandError::Query(e) => e.code().code(),
        }
    }
}
