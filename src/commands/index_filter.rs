//! Index filter administration
//!
//! - `list_filters`: every stored filter
//! - `set_filter`: validate and install a filter for one query shape
//! - `clear_filters`: remove one shape's filter, or all of them
//!
//! Setting or clearing a filter evicts the plan cache entries of the
//! affected shapes on the same collection, so the next query of that shape
//! is planned under the new restriction.

use serde_json::{json, Map, Value as Json};

use super::errors::{CommandError, CommandResult};
use crate::observability::{log_event_with_fields, Event};
use crate::plan_cache::{CollectionInfo, PlanCache};
use crate::query::{CanonicalQuery, FindCommand};
use crate::query_settings::{AllowedIndex, AllowedIndexEntry, QuerySettings};

/// `{filters: [...]}`, ordered by shape.
pub fn list_filters(settings: &QuerySettings) -> Json {
    let filters: Vec<Json> = settings.list().iter().map(AllowedIndexEntry::to_json).collect();
    json!({ "filters": filters })
}

/// Install the filter described by `cmd`:
/// `{query, sort?, projection?, collation?, indexes}`.
pub fn set_filter(
    settings: &QuerySettings,
    cache: &PlanCache,
    collection: &CollectionInfo,
    cmd: &Json,
) -> CommandResult<()> {
    let cmd = cmd.as_object().ok_or(CommandError::NotAnObject)?;
    let query = canonicalize(cmd)?.ok_or(CommandError::MissingField("query"))?;
    let indexes = parse_indexes(cmd)?;

    let shape = query.shape();
    let command = query.command();
    let entry = AllowedIndexEntry {
        query: command.filter.clone(),
        sort: command.sort.clone().unwrap_or_else(|| json!({})),
        projection: command.projection.clone().unwrap_or_else(|| json!({})),
        collation: command.collation.clone(),
        indexes,
    };
    let index_count = entry.indexes.len().to_string();
    settings.set(shape.clone(), entry);

    let evicted = evict_shape(cache, collection, &shape).to_string();
    log_event_with_fields(
        Event::IndexFilterSet,
        &[
            ("evicted", evicted.as_str()),
            ("indexes", index_count.as_str()),
            ("namespace", collection.namespace.as_str()),
            ("query_shape", shape.as_str()),
        ],
    );
    Ok(())
}

/// Remove the filter for the shape of `cmd.query`, or every filter when
/// `cmd` has no query. Clearing a shape with no filter succeeds.
pub fn clear_filters(
    settings: &QuerySettings,
    cache: &PlanCache,
    collection: &CollectionInfo,
    cmd: &Json,
) -> CommandResult<()> {
    let cmd = cmd.as_object().ok_or(CommandError::NotAnObject)?;

    let shapes = match canonicalize(cmd)? {
        Some(query) => {
            let shape = query.shape();
            if settings.remove(&shape) {
                vec![shape]
            } else {
                Vec::new()
            }
        }
        None => settings.clear_all(),
    };

    let mut evicted = 0;
    for shape in &shapes {
        evicted += evict_shape(cache, collection, shape);
    }

    let cleared = shapes.len().to_string();
    let evicted = evicted.to_string();
    log_event_with_fields(
        Event::IndexFilterClear,
        &[
            ("cleared", cleared.as_str()),
            ("evicted", evicted.as_str()),
            ("namespace", collection.namespace.as_str()),
        ],
    );
    Ok(())
}

fn evict_shape(cache: &PlanCache, collection: &CollectionInfo, shape: &str) -> usize {
    cache.remove_if(|key, _| key.shape() == shape && key.namespace() == collection.namespace)
}

/// Canonicalize the query part of `cmd`. None when `cmd` has no query,
/// which is only valid if sort, projection and collation are absent too.
fn canonicalize(cmd: &Map<String, Json>) -> CommandResult<Option<CanonicalQuery>> {
    let sort = optional_object(cmd, "sort")?;
    let projection = optional_object(cmd, "projection")?;
    let collation = optional_object(cmd, "collation")?;

    let filter = match cmd.get("query") {
        Some(q @ Json::Object(_)) => q.clone(),
        Some(_) => return Err(CommandError::invalid("query", "must be an object")),
        None => {
            for (field, present) in [
                ("sort", sort.is_some()),
                ("projection", projection.is_some()),
                ("collation", collation.is_some()),
            ] {
                if present {
                    return Err(CommandError::RequiresQuery(field));
                }
            }
            return Ok(None);
        }
    };

    let mut command = FindCommand::new(filter);
    command.sort = sort;
    command.projection = projection;
    command.collation = collation;
    Ok(Some(CanonicalQuery::canonicalize(command)?))
}

fn optional_object(cmd: &Map<String, Json>, field: &'static str) -> CommandResult<Option<Json>> {
    match cmd.get(field) {
        None => Ok(None),
        Some(v @ Json::Object(_)) => Ok(Some(v.clone())),
        Some(_) => Err(CommandError::invalid(field, "must be an object")),
    }
}

/// `indexes` must be a non-empty array of non-empty key pattern objects or
/// index names.
fn parse_indexes(cmd: &Map<String, Json>) -> CommandResult<Vec<AllowedIndex>> {
    let items = match cmd.get("indexes") {
        Some(Json::Array(items)) => items,
        Some(_) => return Err(CommandError::invalid("indexes", "must be an array")),
        None => return Err(CommandError::MissingField("indexes")),
    };
    if items.is_empty() {
        return Err(CommandError::invalid("indexes", "must not be empty"));
    }

    items
        .iter()
        .map(|item| match item {
            Json::Object(pattern) if !pattern.is_empty() => {
                Ok(AllowedIndex::KeyPattern(pattern.clone()))
            }
            Json::Object(_) => Err(CommandError::invalid(
                "indexes",
                "key pattern must not be empty",
            )),
            Json::String(name) => Ok(AllowedIndex::Name(name.clone())),
            other => Err(CommandError::invalid(
                "indexes",
                format!("each index must be a key pattern or a name, got {}", other),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (QuerySettings, PlanCache, CollectionInfo) {
        (QuerySettings::new(), PlanCache::new(10), CollectionInfo::new("test.coll"))
    }

    #[test]
    fn test_list_empty() {
        let (settings, _, _) = fixture();
        assert_eq!(list_filters(&settings), json!({"filters": []}));
    }

    #[test]
    fn test_set_rejects_invalid_commands() {
        let (settings, cache, coll) = fixture();
        for cmd in [
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
            json!(7),
        ] {
            assert!(set_filter(&settings, &cache, &coll, &cmd).is_err(), "{}", cmd);
        }
        assert!(settings.is_empty());
    }

    #[test]
    fn test_clear_rejects_invalid_commands() {
        let (settings, cache, coll) = fixture();
        for cmd in [
            json!({"query": 1234}),
            json!({"query": {"a": 1}, "sort": 1234}),
            json!({"query": {"a": 1}, "projection": 1234}),
            json!({"query": {"a": {"$no_such_op": 1}}}),
            json!({"sort": {"a": 1}}),
            json!({"projection": {"_id": 0, "a": 1}}),
        ] {
            assert!(clear_filters(&settings, &cache, &coll, &cmd).is_err(), "{}", cmd);
        }
    }

    #[test]
    fn test_clear_nonexistent_filter_succeeds() {
        let (settings, cache, coll) = fixture();
        set_filter(&settings, &cache, &coll, &json!({"query": {"a": 1}, "indexes": [{"a": 1}]}))
            .unwrap();
        clear_filters(&settings, &cache, &coll, &json!({"query": {"b": 1}})).unwrap();
        assert_eq!(settings.len(), 1);
    }

    #[test]
    fn test_error_code_from_query() {
        let (settings, cache, coll) = fixture();
        let err = set_filter(
            &settings,
            &cache,
            &coll,
            &json!({"query": {"a": {"$no_such_op": 1}}, "indexes": [{"a": 1}]}),
        )
        .unwrap_err();
        assert_eq!(err.code(), "AERO_QUERY_UNKNOWN_OPERATOR");
    }
}
