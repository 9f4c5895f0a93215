//! Collation
//!
//! A collation changes how strings compare. Bounds over strings are built
//! from comparison keys rather than raw strings, so a collator maps each
//! string to its key. `{locale: "simple"}` (or no collation) means binary
//! comparison.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use super::errors::{QueryError, QueryResult};

/// Locale of the reverse-string collator, used to exercise collation-aware
/// paths.
pub const MOCK_REVERSE_STRING_LOCALE: &str = "mock_reverse_string";

/// Maps strings to comparison keys.
pub trait Collator: Send + Sync + fmt::Debug {
    fn locale(&self) -> &str;
    fn comparison_key(&self, s: &str) -> String;
}

/// Compares strings by their reversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseStringCollator;

impl Collator for ReverseStringCollator {
    fn locale(&self) -> &str {
        MOCK_REVERSE_STRING_LOCALE
    }

    fn comparison_key(&self, s: &str) -> String {
        s.chars().rev().collect()
    }
}

/// A validated collation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationSpec {
    locale: String,
    /// All fields, sorted by name
    fields: BTreeMap<String, Json>,
}

impl CollationSpec {
    /// Parse a collation document.
    ///
    /// Returns None for the simple collation.
    pub fn parse(doc: &Json) -> QueryResult<Option<CollationSpec>> {
        let obj = doc
            .as_object()
            .ok_or_else(|| QueryError::bad_collation("collation must be an object"))?;
        if obj.is_empty() {
            return Ok(None);
        }

        let locale = obj
            .get("locale")
            .and_then(Json::as_str)
            .ok_or_else(|| QueryError::bad_collation("collation requires a string locale"))?;
        if locale == "simple" {
            return Ok(None);
        }

        Ok(Some(CollationSpec {
            locale: locale.to_string(),
            fields: obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Field-order-independent encoding, used in plan cache keys.
    pub fn canonical_string(&self) -> String {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }

    /// The collation as a JSON document with sorted fields.
    pub fn to_json(&self) -> Json {
        Json::Object(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

/// Collator for a collation, or an error for unsupported locales.
pub fn collator_for(spec: &CollationSpec) -> QueryResult<Arc<dyn Collator>> {
    match spec.locale() {
        MOCK_REVERSE_STRING_LOCALE => Ok(Arc::new(ReverseStringCollator)),
        other => Err(QueryError::bad_collation(format!(
            "unsupported collation locale: {}",
            other
        ))),
    }
}
