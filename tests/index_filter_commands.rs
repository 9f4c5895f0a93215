//! Index Filter Command Tests
//!
//! Tests for index filter administration:
//! - Malformed set and clear commands are rejected without side effects
//! - Setting a filter replaces any filter of the same shape
//! - Setting or clearing a filter evicts cached plans of that shape only
//! - Collation is part of the shape a filter applies to

use aeroplan::commands::{clear_filters, list_filters, set_filter, CommandError};
use aeroplan::plan_cache::{
    key_factory, CandidatePlanStats, CollectionInfo, DebugInfo, PlanCache, PlanCacheKey,
    PlanRankingDecision, SolutionCacheData,
};
use aeroplan::query::{CanonicalQuery, FindCommand};
use aeroplan::query_settings::QuerySettings;
use chrono::Utc;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

struct Fixture {
    settings: QuerySettings,
    cache: PlanCache,
    collection: CollectionInfo,
}

impl Fixture {
    fn new() -> Self {
        Self {
            settings: QuerySettings::new(),
            cache: PlanCache::new(100),
            collection: CollectionInfo::new("test.coll"),
        }
    }

    fn set(&self, cmd: Value) -> Result<(), CommandError> {
        set_filter(&self.settings, &self.cache, &self.collection, &cmd)
    }

    fn clear(&self, cmd: Value) -> Result<(), CommandError> {
        clear_filters(&self.settings, &self.cache, &self.collection, &cmd)
    }

    fn filters(&self) -> Vec<Value> {
        match list_filters(&self.settings)["filters"].as_array() {
            Some(filters) => filters.clone(),
            None => panic!("listing has no filters array"),
        }
    }

    /// Cache a collection scan for the query, returning its key.
    fn add_cache_entry(&self, command: FindCommand) -> PlanCacheKey {
        let query = CanonicalQuery::canonicalize(command).expect("valid query");
        let key = key_factory::make(&query, &self.collection);
        let decision =
            PlanRankingDecision::from_scores(vec![CandidatePlanStats::new("COLLSCAN", 1.0, 5)]);
        self.cache
            .set(
                key.clone(),
                SolutionCacheData::collection_scan(),
                decision,
                Utc::now(),
                DebugInfo::from_query(&query),
                None,
            )
            .expect("valid decision");
        key
    }
}

fn find(filter: Value, sort: Value, projection: Value) -> FindCommand {
    FindCommand::new(filter)
        .with_sort(sort)
        .with_projection(projection)
}

fn reverse_collation() -> Value {
    json!({"locale": "mock_reverse_string"})
}

// =============================================================================
// Invalid Command Tests
// =============================================================================

#[test]
fn test_set_filter_invalid_parameters() {
    let f = Fixture::new();
    let invalid = vec![
        json!({}),
        json!({"indexes": [{"a": 1}]}),
        json!({"query": {"a": 1}}),
        json!({"query": 1234, "indexes": [{"a": 1}]}),
        json!({"query": {"a": 1}, "indexes": 1234}),
        json!({"query": {"a": 1}, "indexes": []}),
        json!({"query": {"a": 1}, "indexes": [{"a": 1}, 99]}),
        json!({"query": {"a": 1}, "indexes": [{"a": 1}, {}]}),
        json!({"query": {"a": 1}, "sort": 1234, "indexes": [{"a": 1}]}),
        json!({"query": {"a": 1}, "projection": 1234, "indexes": [{"a": 1}]}),
        json!({"query": {"a": 1}, "collation": 1234, "indexes": [{"a": 1}]}),
        json!({"query": {"a": {"$no_such_op": 1}}, "indexes": [{"a": 1}]}),
    ];

    for cmd in invalid {
        assert!(f.set(cmd.clone()).is_err(), "accepted {}", cmd);
    }
    assert!(f.filters().is_empty());
}

#[test]
fn test_clear_filters_invalid_parameters() {
    let f = Fixture::new();
    let invalid = vec![
        json!({"query": 1234}),
        json!({"query": {"a": 1}, "sort": 1234}),
        json!({"query": {"a": 1}, "projection": 1234}),
        json!({"query": {"a": {"$no_such_op": 1}}}),
        json!({"sort": {"a": 1}}),
        json!({"projection": {"_id": 0, "a": 1}}),
    ];

    for cmd in invalid {
        assert!(f.clear(cmd.clone()).is_err(), "accepted {}", cmd);
    }
}

#[test]
fn test_clear_without_query_names_the_field() {
    let f = Fixture::new();
    let err = f.clear(json!({"sort": {"a": 1}})).unwrap_err();
    assert!(matches!(err, CommandError::RequiresQuery("sort")));
}

#[test]
fn test_clear_nonexistent_filter() {
    let f = Fixture::new();
    f.set(json!({"query": {"a": 1}, "indexes": [{"a": 1}]})).unwrap();
    assert_eq!(f.filters().len(), 1);

    f.clear(json!({"query": {"b": 1}})).unwrap();
    assert_eq!(f.filters().len(), 1);
}

// =============================================================================
// Set and Clear Tests
// =============================================================================

#[test]
fn test_set_and_clear_filters() {
    let f = Fixture::new();

    let cached = f.add_cache_entry(
        find(json!({"a": 1, "b": 1}), json!({"a": -1}), json!({"_id": 0, "a": 1}))
            .with_collation(reverse_collation()),
    );
    assert!(f.cache.contains(&cached));

    f.set(json!({
        "query": {"a": 1, "b": 1},
        "sort": {"a": -1},
        "projection": {"_id": 0, "a": 1},
        "collation": reverse_collation(),
        "indexes": [{"a": 1}],
    }))
    .unwrap();
    assert!(!f.cache.contains(&cached));

    let filters = f.filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["query"], json!({"a": 1, "b": 1}));
    assert_eq!(filters[0]["sort"], json!({"a": -1}));
    assert_eq!(filters[0]["projection"], json!({"_id": 0, "a": 1}));
    assert_eq!(filters[0]["collation"], reverse_collation());
    assert_eq!(filters[0]["indexes"], json!([{"a": 1}]));

    // Same shape, different literals and field order: replaces the filter
    f.set(json!({
        "query": {"b": 2, "a": 3},
        "sort": {"a": -1},
        "projection": {"_id": 0, "a": 1},
        "collation": reverse_collation(),
        "indexes": [{"a": 1, "b": 1}],
    }))
    .unwrap();
    let filters = f.filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["indexes"], json!([{"a": 1, "b": 1}]));

    f.set(json!({"query": {"b": 1}, "indexes": [{"b": 1}]})).unwrap();
    f.set(json!({"query": {"a": 1}, "indexes": [{"a": 1}]})).unwrap();
    assert_eq!(f.filters().len(), 3);

    let a = f.add_cache_entry(FindCommand::new(json!({"a": 1})));
    let b = f.add_cache_entry(FindCommand::new(json!({"b": 1})));

    f.clear(json!({"query": {"a": 1}})).unwrap();
    assert_eq!(f.filters().len(), 2);
    assert!(!f.cache.contains(&a));
    assert!(f.cache.contains(&b));

    f.clear(json!({})).unwrap();
    assert!(f.filters().is_empty());
    assert!(!f.cache.contains(&b));
}

#[test]
fn test_set_and_clear_filters_collation() {
    let f = Fixture::new();

    let collated =
        f.add_cache_entry(FindCommand::new(json!({"a": "foo"})).with_collation(reverse_collation()));
    let plain = f.add_cache_entry(FindCommand::new(json!({"a": "foo"})));
    assert!(f.cache.contains(&collated));
    assert!(f.cache.contains(&plain));

    f.set(json!({
        "query": {"a": "foo"},
        "collation": reverse_collation(),
        "indexes": [{"a": 1}],
    }))
    .unwrap();
    assert_eq!(f.filters().len(), 1);
    assert!(!f.cache.contains(&collated));
    assert!(f.cache.contains(&plain));

    f.set(json!({"query": {"a": "foo"}, "indexes": [{"b": 1}]})).unwrap();
    assert_eq!(f.filters().len(), 2);

    let collated =
        f.add_cache_entry(FindCommand::new(json!({"a": "foo"})).with_collation(reverse_collation()));
    let plain = f.add_cache_entry(FindCommand::new(json!({"a": "foo"})));

    f.clear(json!({"query": {"a": "foo"}, "collation": reverse_collation()}))
        .unwrap();
    let filters = f.filters();
    assert_eq!(filters.len(), 1);
    assert!(filters[0].get("collation").is_none());
    assert_eq!(filters[0]["indexes"], json!([{"b": 1}]));
    assert!(!f.cache.contains(&collated));
    assert!(f.cache.contains(&plain));
}

#[test]
fn test_set_filter_accepts_index_names() {
    let f = Fixture::new();
    f.set(json!({"query": {"a": 2}, "indexes": [{"a": 1}, "a_1:rev"]}))
        .unwrap();

    let filters = f.filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["indexes"], json!([{"a": 1}, "a_1:rev"]));
}

#[test]
fn test_filters_are_per_collection() {
    let f = Fixture::new();
    let other = CollectionInfo::new("test.other");

    let query = CanonicalQuery::canonicalize(FindCommand::new(json!({"a": 1}))).unwrap();
    let other_key = key_factory::make(&query, &other);
    f.cache
        .set(
            other_key.clone(),
            SolutionCacheData::collection_scan(),
            PlanRankingDecision::from_scores(vec![CandidatePlanStats::new("COLLSCAN", 1.0, 1)]),
            Utc::now(),
            DebugInfo::from_query(&query),
            None,
        )
        .unwrap();

    f.set(json!({"query": {"a": 1}, "indexes": [{"a": 1}]})).unwrap();
    assert!(f.cache.contains(&other_key));
}
