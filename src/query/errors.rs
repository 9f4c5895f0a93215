//! Query parsing and canonicalization errors
//!
//! Error codes:
//! - AERO_QUERY_BAD_VALUE (REJECT)
//! - AERO_QUERY_UNKNOWN_OPERATOR (REJECT)
//! - AERO_QUERY_BAD_REGEX (REJECT)
//! - AERO_QUERY_BAD_COLLATION (REJECT)
//! - AERO_QUERY_BAD_TYPE (REJECT)

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed filter, sort, projection or operator argument
    AeroQueryBadValue,
    /// `$`-prefixed operator that is not supported
    AeroQueryUnknownOperator,
    /// Regex pattern or options that do not compile
    AeroQueryBadRegex,
    /// Malformed or unsupported collation
    AeroQueryBadCollation,
    /// Unknown `$type` alias or code
    AeroQueryBadType,
}

impl QueryErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::AeroQueryBadValue => "AERO_QUERY_BAD_VALUE",
            QueryErrorCode::AeroQueryUnknownOperator => "AERO_QUERY_UNKNOWN_OPERATOR",
            QueryErrorCode::AeroQueryBadRegex => "AERO_QUERY_BAD_REGEX",
            QueryErrorCode::AeroQueryBadCollation => "AERO_QUERY_BAD_COLLATION",
            QueryErrorCode::AeroQueryBadType => "AERO_QUERY_BAD_TYPE",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with context
#[derive(Debug, Clone)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    /// Field path if applicable
    field: Option<String>,
}

impl QueryError {
    pub fn bad_value(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::AeroQueryBadValue,
            message: reason.into(),
            field: None,
        }
    }

    /// Bad operator argument on a specific field
    pub fn bad_field_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::AeroQueryBadValue,
            message: format!("Field '{}': {}", f, reason.into()),
            field: Some(f),
        }
    }

    pub fn unknown_operator(op: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::AeroQueryUnknownOperator,
            message: format!("Unknown operator: {}", op.into()),
            field: None,
        }
    }

    pub fn bad_regex(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::AeroQueryBadRegex,
            message: format!("Invalid regex for field '{}': {}", f, reason.into()),
            field: Some(f),
        }
    }

    pub fn bad_collation(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::AeroQueryBadCollation,
            message: reason.into(),
            field: None,
        }
    }

    pub fn bad_type(field: impl Into<String>, alias: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::AeroQueryBadType,
            message: format!("Unknown type name alias for field '{}': {}", f, alias.into()),
            field: Some(f),
        }
    }

    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
