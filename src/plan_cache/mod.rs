//! Query plan cache
//!
//! Maps a query shape on a collection to the winning plan chosen for it,
//! so later queries of the same shape skip multi-planning. Cached bounds
//! are stored as interval evaluation trees and re-derived from each new
//! query's literals.
//!
//! # Usage
//!
//! ```ignore
//! let cache = PlanCache::new(5000);
//! let key = key_factory::make(&query, &collection);
//! match cache.get(&key) {
//!     Some(entry) => { let bounds = cache.prepare_bounds(&entry, &query)?; }
//!     None => { cache.set(key, solution, decision, Utc::now(), DebugInfo::from_query(&query), None)?; }
//! }
//! ```

mod cache;
mod config;
mod entry;
mod errors;
mod key;
pub mod key_factory;
mod ranking;
mod solution;

pub use cache::{PlanCache, DEFAULT_WORKS_GROWTH_COEFFICIENT};
pub use config::PlanCacheConfig;
pub use entry::{CreatedFromQuery, DebugInfo, PlanCacheEntry};
pub use errors::{PlanCacheError, PlanCacheErrorCode, PlanCacheResult, Severity};
pub use key::PlanCacheKey;
pub use key_factory::CollectionInfo;
pub use ranking::{CandidatePlanStats, PlanRankingDecision};
pub use solution::SolutionCacheData;
