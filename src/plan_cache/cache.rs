//! Bounded LRU plan cache
//!
//! # Invariants
//!
//! - At most `capacity` entries
//! - `get` refreshes recency; listing does not
//! - `set` on a full cache evicts the least recently used entry first, so the
//!   entry being written is never the one evicted
//! - Entries are shared immutable values; `set` replaces them wholesale
//!
//! One mutex guards the map and its recency order together. Nothing under
//! the lock logs or blocks; events are emitted after it is released.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use lru::LruCache;

use super::config::PlanCacheConfig;
use super::entry::{DebugInfo, PlanCacheEntry};
use super::errors::{PlanCacheError, PlanCacheResult};
use super::key::PlanCacheKey;
use super::ranking::PlanRankingDecision;
use super::solution::SolutionCacheData;
use crate::bounds::IndexBounds;
use crate::iet::IetResult;
use crate::observability::{log_event_with_fields, Event, PlanCacheMetrics};
use crate::query::CanonicalQuery;

pub const DEFAULT_WORKS_GROWTH_COEFFICIENT: f64 = 2.0;

pub struct PlanCache {
    entries: Mutex<LruCache<PlanCacheKey, Arc<PlanCacheEntry>>>,
    works_growth_coefficient: f64,
    metrics: PlanCacheMetrics,
}

/// What `set` did, reported once the lock is released.
enum SetOutcome {
    Inserted { evicted: Option<PlanCacheKey> },
    Replaced { generation: u64 },
}

impl PlanCache {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            works_growth_coefficient: DEFAULT_WORKS_GROWTH_COEFFICIENT,
            metrics: PlanCacheMetrics::new(),
        }
    }

    pub fn from_config(config: &PlanCacheConfig) -> PlanCacheResult<Self> {
        config.validate()?;
        let mut cache = Self::new(config.max_entries);
        cache.works_growth_coefficient = config.works_growth_coefficient;
        Ok(cache)
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn contains(&self, key: &PlanCacheKey) -> bool {
        self.lock().contains(key)
    }

    pub fn metrics(&self) -> &PlanCacheMetrics {
        &self.metrics
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &PlanCacheKey) -> Option<Arc<PlanCacheEntry>> {
        let found = self.lock().get(key).cloned();

        let event = if found.is_some() {
            self.metrics.increment_hits();
            Event::PlanCacheHit
        } else {
            self.metrics.increment_misses();
            Event::PlanCacheMiss
        };
        log_event_with_fields(event, &[("query_shape", key.shape())]);
        found
    }

    /// Store the winning solution for `key`.
    ///
    /// Replacing an existing entry resets its works estimate from the new
    /// decision and bumps its generation. `growth` overrides the configured
    /// works growth coefficient for this entry.
    pub fn set(
        &self,
        key: PlanCacheKey,
        solution: SolutionCacheData,
        decision: PlanRankingDecision,
        now: DateTime<Utc>,
        debug_info: DebugInfo,
        growth: Option<f64>,
    ) -> PlanCacheResult<()> {
        decision.validate()?;
        let works = decision.winner().map(|w| w.works).unwrap_or(0);
        let coefficient = growth.unwrap_or(self.works_growth_coefficient);
        if !(coefficient > 1.0) || coefficient.is_infinite() {
            return Err(PlanCacheError::bad_decision(format!(
                "works_growth_coefficient must be a finite number > 1.0, got {}",
                coefficient
            )));
        }

        let query_hash = key.query_hash();
        let plan_cache_key_hash = key.plan_cache_key_hash();
        let shape = key.shape().to_string();

        let outcome = {
            let mut entries = self.lock();
            let generation = entries.peek(&key).map(|old| old.generation + 1);
            let entry = Arc::new(PlanCacheEntry {
                solution,
                decision,
                time_of_creation: now,
                works,
                works_growth_coefficient: coefficient,
                generation: generation.unwrap_or(0),
                debug_info,
                query_hash: query_hash.clone(),
                plan_cache_key_hash,
            });

            match generation {
                Some(generation) => {
                    entries.put(key, entry);
                    SetOutcome::Replaced { generation }
                }
                None => {
                    let evicted = if entries.len() >= entries.cap().get() {
                        entries.pop_lru().map(|(k, _)| k)
                    } else {
                        None
                    };
                    entries.put(key, entry);
                    SetOutcome::Inserted { evicted }
                }
            }
        };

        match outcome {
            SetOutcome::Inserted { evicted } => {
                if let Some(evicted) = evicted {
                    self.metrics.increment_evictions();
                    let evicted_hash = evicted.query_hash();
                    log_event_with_fields(
                        Event::PlanCacheEvict,
                        &[
                            ("query_hash", evicted_hash.as_str()),
                            ("query_shape", evicted.shape()),
                        ],
                    );
                }
                self.metrics.increment_sets();
                log_event_with_fields(
                    Event::PlanCacheSet,
                    &[("query_hash", query_hash.as_str()), ("query_shape", shape.as_str())],
                );
            }
            SetOutcome::Replaced { generation } => {
                self.metrics.increment_replacements();
                let generation = generation.to_string();
                log_event_with_fields(
                    Event::PlanCacheReplace,
                    &[
                        ("generation", generation.as_str()),
                        ("query_hash", query_hash.as_str()),
                        ("query_shape", shape.as_str()),
                    ],
                );
            }
        }
        Ok(())
    }

    /// Remove `key`. Returns true if an entry was present.
    pub fn remove(&self, key: &PlanCacheKey) -> bool {
        let removed = self.lock().pop(key).is_some();
        if removed {
            self.metrics.add_removals(1);
            log_event_with_fields(Event::PlanCacheRemove, &[("query_shape", key.shape())]);
        }
        removed
    }

    /// Remove every entry matching `pred`. Returns the number removed.
    pub fn remove_if<F>(&self, pred: F) -> usize
    where
        F: Fn(&PlanCacheKey, &PlanCacheEntry) -> bool,
    {
        let removed: Vec<PlanCacheKey> = {
            let mut entries = self.lock();
            let doomed: Vec<PlanCacheKey> = entries
                .iter()
                .filter(|&(k, v)| pred(k, &**v))
                .map(|(k, _)| k.clone())
                .collect();
            for key in &doomed {
                entries.pop(key);
            }
            doomed
        };

        self.metrics.add_removals(removed.len() as u64);
        for key in &removed {
            log_event_with_fields(Event::PlanCacheRemove, &[("query_shape", key.shape())]);
        }
        removed.len()
    }

    pub fn clear(&self) {
        let count = {
            let mut entries = self.lock();
            let count = entries.len();
            entries.clear();
            count
        };
        self.metrics.increment_clears();
        self.metrics.add_removals(count as u64);
        let count = count.to_string();
        log_event_with_fields(Event::PlanCacheClear, &[("entries", count.as_str())]);
    }

    /// Snapshot of every entry, most recently used first.
    ///
    /// Does not change recency.
    pub fn list_entries(&self) -> Vec<(PlanCacheKey, Arc<PlanCacheEntry>)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    /// Re-derive index bounds for `query` from a cached entry.
    pub fn prepare_bounds(
        &self,
        entry: &PlanCacheEntry,
        query: &CanonicalQuery,
    ) -> IetResult<Option<IndexBounds>> {
        let result = entry.solution.prepare_bounds(query);
        if result.is_err() {
            self.metrics.increment_eval_failures();
        }
        result
    }

    // Entries are replaced wholesale, so a panic elsewhere cannot leave
    // the map half-updated.
    fn lock(&self) -> MutexGuard<'_, LruCache<PlanCacheKey, Arc<PlanCacheEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCache")
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .finish()
    }
}
