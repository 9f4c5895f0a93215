//! Canonical queries
//!
//! A `CanonicalQuery` is a validated find command whose filter has been
//! parsed, normalized and auto-parameterized. It is the unit the plan cache
//! key factory and the index filter layer work with.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::collation::{collator_for, CollationSpec, Collator};
use super::errors::{QueryError, QueryResult};
use super::expression::MatchExpression;
use super::normalize::normalize;
use super::parameterize::{extract_bindings, parameterize};
use super::parser::parse_filter;
use super::shape::{encode_filter_shape, LiteralMode};
use crate::iet::InputParamBindings;

/// The query-related parts of a find request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindCommand {
    pub filter: Json,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<Json>,
}

impl FindCommand {
    pub fn new(filter: Json) -> Self {
        Self {
            filter,
            sort: None,
            projection: None,
            collation: None,
        }
    }

    pub fn with_sort(mut self, sort: Json) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_projection(mut self, projection: Json) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_collation(mut self, collation: Json) -> Self {
        self.collation = Some(collation);
        self
    }
}

/// A validated, normalized, parameterized query.
#[derive(Clone)]
pub struct CanonicalQuery {
    command: FindCommand,
    root: MatchExpression,
    param_count: usize,
    sort_shape: String,
    projection_shape: String,
    collation: Option<CollationSpec>,
    collator: Option<Arc<dyn Collator>>,
}

impl CanonicalQuery {
    pub fn canonicalize(command: FindCommand) -> QueryResult<CanonicalQuery> {
        let sort_shape = match &command.sort {
            Some(sort) => encode_sort(as_object(sort, "sort")?)?,
            None => String::new(),
        };
        let projection_shape = match &command.projection {
            Some(projection) => encode_projection(as_object(projection, "projection")?),
            None => String::new(),
        };
        let collation = match &command.collation {
            Some(doc) => CollationSpec::parse(doc)?,
            None => None,
        };
        let collator = collation.as_ref().map(collator_for).transpose()?;

        let mut root = normalize(parse_filter(&command.filter)?);
        let param_count = parameterize(&mut root);

        Ok(CanonicalQuery {
            command,
            root,
            param_count,
            sort_shape,
            projection_shape,
            collation,
            collator,
        })
    }

    /// The request this query was built from, literals included.
    pub fn command(&self) -> &FindCommand {
        &self.command
    }

    /// Root of the normalized, parameterized filter
    pub fn root(&self) -> &MatchExpression {
        &self.root
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Literals bound to this query's parameter slots.
    pub fn input_bindings(&self) -> InputParamBindings {
        extract_bindings(&self.root)
    }

    pub fn filter_shape(&self) -> String {
        encode_filter_shape(&self.root, LiteralMode::Parameterized)
    }

    pub fn sort_shape(&self) -> &str {
        &self.sort_shape
    }

    pub fn projection_shape(&self) -> &str {
        &self.projection_shape
    }

    pub fn collation(&self) -> Option<&CollationSpec> {
        self.collation.as_ref()
    }

    pub fn collator(&self) -> Option<&dyn Collator> {
        self.collator.as_deref()
    }

    /// Full query shape: filter, sort, projection and collation.
    ///
    /// Queries with equal shapes share a plan cache entry and an index
    /// filter.
    pub fn shape(&self) -> String {
        let collation = self
            .collation
            .as_ref()
            .map(CollationSpec::canonical_string)
            .unwrap_or_default();
        format!(
            "{}|sort:{}|proj:{}|coll:{}",
            self.filter_shape(),
            self.sort_shape,
            self.projection_shape,
            collation
        )
    }
}

impl fmt::Debug for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalQuery")
            .field("shape", &self.shape())
            .field("param_count", &self.param_count)
            .finish()
    }
}

fn as_object<'a>(value: &'a Json, what: &str) -> QueryResult<&'a Map<String, Json>> {
    value
        .as_object()
        .ok_or_else(|| QueryError::bad_value(format!("{} must be an object", what)))
}

/// Sort keys keep their written order; directions must be 1 or -1.
/// An empty sort encodes like no sort.
fn encode_sort(sort: &Map<String, Json>) -> QueryResult<String> {
    if sort.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(sort.len());
    for (field, direction) in sort {
        let dir = match direction.as_f64() {
            Some(d) if d == 1.0 => "1".to_string(),
            Some(d) if d == -1.0 => "-1".to_string(),
            _ => match direction.as_object().and_then(|o| o.get("$meta")) {
                Some(Json::String(meta)) => format!("{{$meta: {}}}", meta),
                _ => {
                    return Err(QueryError::bad_field_value(
                        field.as_str(),
                        "sort direction must be 1, -1 or a $meta object",
                    ))
                }
            },
        };
        parts.push(format!("{}: {}", field, dir));
    }
    Ok(format!("{{{}}}", parts.join(", ")))
}

/// Projection fields are order-independent; inclusion flags are folded to
/// 1 and 0.
fn encode_projection(projection: &Map<String, Json>) -> String {
    if projection.is_empty() {
        return String::new();
    }
    let mut parts: Vec<String> = projection
        .iter()
        .map(|(field, spec)| {
            let spec = match spec {
                Json::Bool(true) => "1".to_string(),
                Json::Bool(false) => "0".to_string(),
                Json::Number(n) => {
                    if n.as_f64() == Some(0.0) {
                        "0".to_string()
                    } else {
                        "1".to_string()
                    }
                }
                other => other.to_string(),
            };
            format!("{}: {}", field, spec)
        })
        .collect();
    parts.sort();
    format!("{{{}}}", parts.join(", "))
}
