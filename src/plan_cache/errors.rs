//! Plan cache error types
//!
//! Error codes:
//! - AERO_PLAN_CACHE_BAD_DECISION (REJECT)
//! - AERO_PLAN_CACHE_BAD_CONFIG (FATAL)

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, cache unchanged
    Reject,
    /// The cache cannot be constructed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCacheErrorCode {
    /// Ranking decision is empty or inconsistent
    AeroPlanCacheBadDecision,
    /// Configuration is unreadable or out of range
    AeroPlanCacheBadConfig,
}

impl PlanCacheErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PlanCacheErrorCode::AeroPlanCacheBadDecision => "AERO_PLAN_CACHE_BAD_DECISION",
            PlanCacheErrorCode::AeroPlanCacheBadConfig => "AERO_PLAN_CACHE_BAD_CONFIG",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PlanCacheErrorCode::AeroPlanCacheBadDecision => Severity::Reject,
            PlanCacheErrorCode::AeroPlanCacheBadConfig => Severity::Fatal,
        }
    }
}

impl fmt::Display for PlanCacheErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct PlanCacheError {
    code: PlanCacheErrorCode,
    message: String,
}

impl PlanCacheError {
    pub fn bad_decision(reason: impl Into<String>) -> Self {
        Self {
            code: PlanCacheErrorCode::AeroPlanCacheBadDecision,
            message: reason.into(),
        }
    }

    pub fn bad_config(reason: impl Into<String>) -> Self {
        Self {
            code: PlanCacheErrorCode::AeroPlanCacheBadConfig,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> PlanCacheErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PlanCacheError {
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

impl std::error::Error for PlanCacheError {}

pub type PlanCacheResult<T> = Result<T, PlanCacheError>;
