//! Multi-planner ranking results
//!
//! Produced by the ranking pipeline and handed to `PlanCache::set`. The
//! cache only validates and stores them.

use serde::{Deserialize, Serialize};

use super::errors::{PlanCacheError, PlanCacheResult};

/// Trial-run statistics for one candidate plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePlanStats {
    /// Human-readable plan summary, e.g. `IXSCAN { a: 1 }`
    pub plan_summary: String,
    pub score: f64,
    /// Work units spent during the trial
    pub works: u64,
    /// Documents produced during the trial
    pub advanced: u64,
    pub is_eof: bool,
}

impl CandidatePlanStats {
    pub fn new(plan_summary: impl Into<String>, score: f64, works: u64) -> Self {
        Self {
            plan_summary: plan_summary.into(),
            score,
            works,
            advanced: 0,
            is_eof: false,
        }
    }
}

/// Statistics for every candidate plus their rank order.
///
/// `candidate_order[0]` indexes the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRankingDecision {
    pub candidates: Vec<CandidatePlanStats>,
    pub candidate_order: Vec<usize>,
}

impl PlanRankingDecision {
    pub fn new(candidates: Vec<CandidatePlanStats>, candidate_order: Vec<usize>) -> Self {
        Self {
            candidates,
            candidate_order,
        }
    }

    /// Rank candidates by descending score; ties keep input order.
    pub fn from_scores(candidates: Vec<CandidatePlanStats>) -> Self {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[b]
                .score
                .partial_cmp(&candidates[a].score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self::new(candidates, order)
    }

    /// The decision must name at least one candidate and `candidate_order`
    /// must be a permutation of the candidate indexes.
    pub fn validate(&self) -> PlanCacheResult<()> {
        if self.candidates.is_empty() {
            return Err(PlanCacheError::bad_decision("decision has no candidates"));
        }
        if self.candidate_order.len() != self.candidates.len() {
            return Err(PlanCacheError::bad_decision(format!(
                "candidate_order has {} entries for {} candidates",
                self.candidate_order.len(),
                self.candidates.len()
            )));
        }
        let mut seen = vec![false; self.candidates.len()];
        for &idx in &self.candidate_order {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(PlanCacheError::bad_decision(format!(
                        "candidate {} ranked twice",
                        idx
                    )))
                }
                None => {
                    return Err(PlanCacheError::bad_decision(format!(
                        "candidate index {} out of range",
                        idx
                    )))
                }
            }
        }
        Ok(())
    }

    /// Stats of the winning plan. None only for an invalid decision.
    pub fn winner(&self) -> Option<&CandidatePlanStats> {
        self.candidate_order
            .first()
            .and_then(|&idx| self.candidates.get(idx))
    }
}
