//! Observability events for aeroplan
//!
//! Events are explicit and typed. Each event carries the severity it is
//! logged at.

use std::fmt;

use super::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Plan cache configuration loaded
    ConfigLoaded,

    // Plan cache
    /// Lookup found an entry
    PlanCacheHit,
    /// Lookup found nothing
    PlanCacheMiss,
    /// New entry stored
    PlanCacheSet,
    /// Existing entry overwritten
    PlanCacheReplace,
    /// Least recently used entry dropped to make room
    PlanCacheEvict,
    /// Entry removed on request
    PlanCacheRemove,
    /// All entries removed
    PlanCacheClear,
    /// Cached bounds could not be re-derived from new literals
    IetEvalFailed,

    // Index filters
    /// Allowed indexes stored for a query shape
    IndexFilterSet,
    /// Allowed indexes removed
    IndexFilterClear,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::PlanCacheHit => "PLAN_CACHE_HIT",
            Event::PlanCacheMiss => "PLAN_CACHE_MISS",
            Event::PlanCacheSet => "PLAN_CACHE_SET",
            Event::PlanCacheReplace => "PLAN_CACHE_REPLACE",
            Event::PlanCacheEvict => "PLAN_CACHE_EVICT",
            Event::PlanCacheRemove => "PLAN_CACHE_REMOVE",
            Event::PlanCacheClear => "PLAN_CACHE_CLEAR",
            Event::IetEvalFailed => "IET_EVAL_FAILED",

            Event::IndexFilterSet => "INDEX_FILTER_SET",
            Event::IndexFilterClear => "INDEX_FILTER_CLEAR",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PlanCacheHit | Event::PlanCacheMiss => Severity::Trace,
            Event::IetEvalFailed => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
