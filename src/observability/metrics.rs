//! Plan cache counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one plan cache instance.
///
/// Relaxed ordering is enough: counters are read for reporting only.
#[derive(Debug, Default)]
pub struct PlanCacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    replacements: AtomicU64,
    evictions: AtomicU64,
    removals: AtomicU64,
    clears: AtomicU64,
    eval_failures: AtomicU64,
}

impl PlanCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sets(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_replacements(&self) {
        self.replacements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evictions(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Count `n` entries removed by remove, clear or an index filter change
    pub fn add_removals(&self, n: u64) {
        self.removals.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_clears(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_eval_failures(&self) {
        self.eval_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PlanCacheMetricsSnapshot {
        PlanCacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            eval_failures: self.eval_failures.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanCacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub replacements: u64,
    pub evictions: u64,
    pub removals: u64,
    pub clears: u64,
    pub eval_failures: u64,
}
