//! Plan cache entries
//!
//! An entry is immutable once built. Updating a key replaces the whole
//! entry; readers holding the old `Arc` keep a consistent snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};

use super::ranking::PlanRankingDecision;
use super::solution::SolutionCacheData;
use crate::query::CanonicalQuery;

/// The literal query that produced an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedFromQuery {
    pub filter: Json,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub created_from_query: CreatedFromQuery,
}

impl DebugInfo {
    pub fn from_query(query: &CanonicalQuery) -> Self {
        let command = query.command();
        Self {
            created_from_query: CreatedFromQuery {
                filter: command.filter.clone(),
                sort: command.sort.clone(),
                projection: command.projection.clone(),
                collation: command.collation.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanCacheEntry {
    pub solution: SolutionCacheData,
    pub decision: PlanRankingDecision,
    pub time_of_creation: DateTime<Utc>,
    /// Works spent by the winning plan during its trial
    pub works: u64,
    pub works_growth_coefficient: f64,
    /// Times this key has been replaced since it was first inserted
    pub generation: u64,
    pub debug_info: DebugInfo,
    pub query_hash: String,
    pub plan_cache_key_hash: String,
}

impl PlanCacheEntry {
    /// Works a cached plan may spend before the caller should replan.
    pub fn works_budget(&self) -> f64 {
        self.works as f64 * self.works_growth_coefficient
    }

    pub fn exceeds_works_budget(&self, works: u64) -> bool {
        works as f64 > self.works_budget()
    }

    /// Read-only description used by listings and the CLI.
    pub fn to_json(&self) -> Json {
        json!({
            "queryHash": self.query_hash,
            "planCacheKey": self.plan_cache_key_hash,
            "plan": self.solution.summary(),
            "indexFilterSet": self.solution.index_filter_applied,
            "works": self.works,
            "worksGrowthCoefficient": self.works_growth_coefficient,
            "generation": self.generation,
            "timeOfCreation": self.time_of_creation.to_rfc3339(),
            "candidates": self.decision.candidates.len(),
            "createdFromQuery": self.debug_info.created_from_query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan_cache::CandidatePlanStats;
    use crate::query::FindCommand;

    fn entry(works: u64, coefficient: f64) -> PlanCacheEntry {
        let query = CanonicalQuery::canonicalize(
            FindCommand::new(json!({"a": 1})).with_sort(json!({"b": 1})),
        )
        .unwrap();
        PlanCacheEntry {
            solution: SolutionCacheData::collection_scan(),
            decision: PlanRankingDecision::new(
                vec![CandidatePlanStats::new("COLLSCAN", 1.0, works)],
                vec![0],
            ),
            time_of_creation: Utc::now(),
            works,
            works_growth_coefficient: coefficient,
            generation: 0,
            debug_info: DebugInfo::from_query(&query),
            query_hash: "00000000".to_string(),
            plan_cache_key_hash: "00000000".to_string(),
        }
    }

    #[test]
    fn test_works_budget() {
        let e = entry(10, 2.0);
        assert_eq!(e.works_budget(), 20.0);
        assert!(!e.exceeds_works_budget(20));
        assert!(e.exceeds_works_budget(21));
    }

    #[test]
    fn test_debug_info_keeps_literals() {
        let e = entry(1, 2.0);
        let json = e.to_json();
        assert_eq!(json["createdFromQuery"]["filter"], json!({"a": 1}));
        assert_eq!(json["createdFromQuery"]["sort"], json!({"b": 1}));
        assert!(json["createdFromQuery"].get("collation").is_none());
        assert_eq!(json["plan"], "COLLSCAN");
    }
}
