//! CLI command implementations
//!
//! Each command builds its result as a JSON value and writes it as a single
//! `{"status":"ok","data":...}` document. The `describe_*` functions hold
//! the logic and are what the tests exercise.

use std::path::Path;

use serde_json::{json, Value};

use crate::bounds::{build_index_bounds, replay, IndexEntry};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::plan_cache::{key_factory, CollectionInfo, PlanCacheConfig};
use crate::query::{CanonicalQuery, FindCommand, MatchExpression};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{parse_json_arg, parse_optional_json_arg, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures are
/// reported as an error document on stdout and returned.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = Severity::parse(&cli.log_level)
        .ok_or_else(|| CliError::bad_input(format!("Invalid log level: '{}'", cli.log_level)))
        .and_then(|severity| {
            Logger::set_min_severity(severity);
            run_command(cli.command)
        });

    if let Err(ref e) = result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let data = match cmd {
        Command::Iet { filter, index } => describe_iet(&filter, index.as_deref())?,
        Command::Key {
            filter,
            sort,
            projection,
            collation,
            namespace,
        } => describe_key(
            &filter,
            sort.as_deref(),
            projection.as_deref(),
            collation.as_deref(),
            &namespace,
        )?,
        Command::Eval {
            filter,
            replay,
            index,
        } => describe_replay(&filter, &replay, index.as_deref())?,
        Command::ConfigCheck { config } => check_config(&config)?,
    };
    write_response(data)
}

/// Per-field IETs and immediate bounds for `filter` on `index`.
pub fn describe_iet(filter: &str, index: Option<&str>) -> CliResult<Value> {
    let query = canonicalize(filter)?;
    let index = resolve_index(&query, index)?;
    let (bounds, recipe) = build_index_bounds(query.root(), &index, query.collator());

    let mut fields = Vec::with_capacity(bounds.fields.len());
    for (fb, fr) in bounds.fields.iter().zip(&recipe.fields) {
        fields.push(json!({
            "field": fb.field,
            "direction": fb.direction,
            "iet": fr.iet.to_string(),
            "bounds": fb.oil.to_string(),
            "tightness": serde_json::to_value(fb.tightness)?,
        }));
    }

    Ok(json!({
        "index": index.name,
        "params": query.param_count(),
        "fields": fields,
    }))
}

/// Plan cache key and hashes for a query.
pub fn describe_key(
    filter: &str,
    sort: Option<&str>,
    projection: Option<&str>,
    collation: Option<&str>,
    namespace: &str,
) -> CliResult<Value> {
    let mut command = FindCommand::new(parse_json_arg("filter", filter)?);
    command.sort = parse_optional_json_arg("sort", sort)?;
    command.projection = parse_optional_json_arg("projection", projection)?;
    command.collation = parse_optional_json_arg("collation", collation)?;

    let query = CanonicalQuery::canonicalize(command)?;
    let key = key_factory::make(&query, &CollectionInfo::new(namespace));

    Ok(json!({
        "shape": key.shape(),
        "namespace": key.namespace(),
        "queryHash": key.query_hash(),
        "planCacheKeyHash": key.plan_cache_key_hash(),
        "params": query.param_count(),
    }))
}

/// Bounds built for `filter`, and the same recipe replayed with the
/// literals of `replay_filter`.
pub fn describe_replay(filter: &str, replay_filter: &str, index: Option<&str>) -> CliResult<Value> {
    let cached = canonicalize(filter)?;
    let incoming = canonicalize(replay_filter)?;
    if cached.shape() != incoming.shape() {
        return Err(CliError::bad_input(format!(
            "Filters have different shapes: '{}' and '{}'",
            cached.shape(),
            incoming.shape()
        )));
    }

    let index = resolve_index(&cached, index)?;
    let (built, recipe) = build_index_bounds(cached.root(), &index, cached.collator());
    let replayed = replay(&recipe, &incoming.input_bindings(), incoming.collator())?;

    let fields: Vec<Value> = recipe
        .fields
        .iter()
        .zip(built.fields.iter().zip(&replayed.fields))
        .map(|(fr, (b, r))| {
            json!({
                "field": fr.field,
                "iet": fr.iet.to_string(),
                "built": b.oil.to_string(),
                "replayed": r.oil.to_string(),
            })
        })
        .collect();

    Ok(json!({
        "index": index.name,
        "shape": cached.shape(),
        "fields": fields,
    }))
}

/// Load and validate a configuration file.
pub fn check_config(path: &Path) -> CliResult<Value> {
    let config = PlanCacheConfig::load(path)?;
    let path_str = path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", path_str.as_str())]);
    Ok(json!({ "valid": true, "config": serde_json::to_value(&config)? }))
}

fn canonicalize(filter: &str) -> CliResult<CanonicalQuery> {
    let filter = parse_json_arg("filter", filter)?;
    Ok(CanonicalQuery::canonicalize(FindCommand::new(filter))?)
}

/// The index named by `--index`, or an ascending index over the filter's
/// top-level fields in normalized order.
fn resolve_index(query: &CanonicalQuery, index: Option<&str>) -> CliResult<IndexEntry> {
    if let Some(text) = index {
        let doc = parse_json_arg("index", text)?;
        let pattern = IndexEntry::key_pattern_from_json(&doc).ok_or_else(|| {
            CliError::bad_input("--index must be a non-empty object of 1 / -1 directions")
        })?;
        return Ok(IndexEntry::from_key_pattern(pattern));
    }

    let mut fields: Vec<(String, i32)> = Vec::new();
    let root = query.root();
    let top_level = match root {
        MatchExpression::And(children) => children.as_slice(),
        other => std::slice::from_ref(other),
    };
    for path in top_level.iter().filter_map(MatchExpression::path) {
        if !fields.iter().any(|(f, _)| f == path) {
            fields.push((path.to_string(), 1));
        }
    }

    if fields.is_empty() {
        return Err(CliError::bad_input(
            "Filter constrains no top-level field; pass --index",
        ));
    }
    Ok(IndexEntry::from_key_pattern(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;
    use std::io::Write;

    #[test]
    fn test_describe_iet_defaults_to_filter_fields() {
        let data = describe_iet(r#"{"b": {"$lt": 3}, "a": 5}"#, None).unwrap();
        assert_eq!(data["index"], "a_1_b_1");
        assert_eq!(data["params"], 2);
        assert_eq!(data["fields"][0]["iet"], "(eval $eq #0)");
        assert_eq!(data["fields"][1]["iet"], "(eval $lt #1)");
        assert_eq!(data["fields"][1]["bounds"], "[-inf.0, 3)");
        assert_eq!(data["fields"][1]["tightness"], "Exact");
    }

    #[test]
    fn test_describe_iet_with_index() {
        let data = describe_iet(r#"{"a": 5}"#, Some(r#"{"a": -1, "c": 1}"#)).unwrap();
        assert_eq!(data["fields"][1]["bounds"], "[MinKey, MaxKey]");
        assert!(describe_iet(r#"{"a": 5}"#, Some(r#"{"a": 2}"#)).is_err());
    }

    #[test]
    fn test_describe_key_literals_do_not_matter() {
        let a = describe_key(r#"{"a": 1}"#, None, None, None, "db.c").unwrap();
        let b = describe_key(r#"{"a": 99}"#, None, None, None, "db.c").unwrap();
        assert_eq!(a["shape"], b["shape"]);
        assert_eq!(a["queryHash"], b["queryHash"]);
    }

    #[test]
    fn test_describe_replay() {
        let data = describe_replay(r#"{"a": {"$gt": 1}}"#, r#"{"a": {"$gt": 7}}"#, None).unwrap();
        assert_eq!(data["fields"][0]["built"], "(1, inf.0]");
        assert_eq!(data["fields"][0]["replayed"], "(7, inf.0]");

        let err = describe_replay(r#"{"a": 1}"#, r#"{"b": 1}"#, None).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::BadInput);
    }

    #[test]
    fn test_check_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"max_entries": 16}"#).unwrap();
        let data = check_config(file.path()).unwrap();
        assert_eq!(data["config"]["max_entries"], 16);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(br#"{"max_entries": 0}"#).unwrap();
        let err = check_config(bad.path()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_unconstrained_filter_needs_index() {
        let err = describe_iet("{}", None).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::BadInput);
    }
}
