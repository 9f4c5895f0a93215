//! Cached query solutions
//!
//! The part of a winning plan needed to rebuild it for a new query of the
//! same shape: the index it scans and one IET per index field.

use crate::bounds::{replay, BoundsRecipe, IndexBounds, IndexEntry};
use crate::iet::IetResult;
use crate::observability::{log_event_with_fields, Event};
use crate::query::CanonicalQuery;

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionCacheData {
    /// Scanned index; None for a collection scan
    pub index: Option<IndexEntry>,
    /// Per-field bound recipes for `index`
    pub recipe: Option<BoundsRecipe>,
    /// The plan was chosen among indexes restricted by an index filter
    pub index_filter_applied: bool,
}

impl SolutionCacheData {
    pub fn collection_scan() -> Self {
        Self {
            index: None,
            recipe: None,
            index_filter_applied: false,
        }
    }

    pub fn index_scan(index: IndexEntry, recipe: BoundsRecipe) -> Self {
        Self {
            index: Some(index),
            recipe: Some(recipe),
            index_filter_applied: false,
        }
    }

    pub fn with_index_filter_applied(mut self, applied: bool) -> Self {
        self.index_filter_applied = applied;
        self
    }

    /// Short description, e.g. `IXSCAN { a: 1, b: -1 }` or `COLLSCAN`
    pub fn summary(&self) -> String {
        match &self.index {
            Some(index) => {
                let fields: Vec<String> = index
                    .key_pattern
                    .iter()
                    .map(|(field, dir)| format!("{}: {}", field, dir))
                    .collect();
                format!("IXSCAN {{ {} }}", fields.join(", "))
            }
            None => "COLLSCAN".to_string(),
        }
    }

    /// Bounds for `query` derived from the cached recipe and the query's
    /// own literals. None for a collection scan.
    ///
    /// A failed evaluation is logged and returned; the caller replans.
    pub fn prepare_bounds(&self, query: &CanonicalQuery) -> IetResult<Option<IndexBounds>> {
        let recipe = match &self.recipe {
            Some(recipe) => recipe,
            None => return Ok(None),
        };
        match replay(recipe, &query.input_bindings(), query.collator()) {
            Ok(bounds) => Ok(Some(bounds)),
            Err(e) => {
                let index = self.index.as_ref().map(|i| i.name.as_str()).unwrap_or("");
                let error = e.to_string();
                let shape = query.shape();
                log_event_with_fields(
                    Event::IetEvalFailed,
                    &[
                        ("error", error.as_str()),
                        ("index", index),
                        ("query_shape", shape.as_str()),
                    ],
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::build_index_bounds;
    use crate::iet::IetErrorCode;
    use crate::query::FindCommand;
    use serde_json::json;

    fn cq(filter: serde_json::Value) -> CanonicalQuery {
        CanonicalQuery::canonicalize(FindCommand::new(filter)).unwrap()
    }

    fn solution_for(query: &CanonicalQuery, fields: &[(&str, i32)]) -> SolutionCacheData {
        let index = IndexEntry::from_key_pattern(
            fields.iter().map(|(f, d)| (f.to_string(), *d)).collect(),
        );
        let (_, recipe) = build_index_bounds(query.root(), &index, query.collator());
        SolutionCacheData::index_scan(index, recipe)
    }

    #[test]
    fn test_prepare_bounds_uses_new_literals() {
        let cached = cq(json!({"a": {"$gt": 1}}));
        let solution = solution_for(&cached, &[("a", 1)]);

        let bounds = solution.prepare_bounds(&cq(json!({"a": {"$gt": 7}}))).unwrap().unwrap();
        assert_eq!(bounds.to_string(), "{a: (7, inf.0]}");
    }

    #[test]
    fn test_collection_scan_has_no_bounds() {
        let solution = SolutionCacheData::collection_scan();
        assert_eq!(solution.summary(), "COLLSCAN");
        assert!(solution.prepare_bounds(&cq(json!({"a": 1}))).unwrap().is_none());
    }

    #[test]
    fn test_missing_binding_fails() {
        let cached = cq(json!({"a": {"$gt": 1}}));
        let solution = solution_for(&cached, &[("a", 1)]);

        // A query of another shape has no slot 0
        let err = solution.prepare_bounds(&cq(json!({}))).unwrap_err();
        assert_eq!(err.code(), IetErrorCode::AeroIetMissingBinding);
    }

    #[test]
    fn test_summary() {
        let solution = solution_for(&cq(json!({"a": 1})), &[("a", 1), ("b", -1)]);
        assert_eq!(solution.summary(), "IXSCAN { a: 1, b: -1 }");
    }
}
