//! Index bounds construction and replay
//!
//! `build_index_bounds` gathers the top-level predicates on each field of an
//! index key pattern, intersects them, and produces both the concrete
//! bounds and a `BoundsRecipe` holding one IET per field. `replay`
//! evaluates a recipe against new parameter bindings.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::rules::PredicateBounds;
use super::translate::{translate, translate_and_intersect};
use super::{OrderedIntervalList, Tightness};
use crate::iet::{evaluate, Builder, Iet, IetResult, InputParamBindings};
use crate::query::{Collator, MatchExpression};

/// An index: a name and an ordered key pattern of (field, direction).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub key_pattern: Vec<(String, i32)>,
}

impl IndexEntry {
    pub fn new(name: impl Into<String>, key_pattern: Vec<(String, i32)>) -> Self {
        Self {
            name: name.into(),
            key_pattern,
        }
    }

    /// Build an index from a key pattern, naming it `field_dir_field_dir`.
    pub fn from_key_pattern(key_pattern: Vec<(String, i32)>) -> Self {
        let name = key_pattern
            .iter()
            .map(|(field, dir)| format!("{}_{}", field, dir))
            .collect::<Vec<_>>()
            .join("_");
        Self::new(name, key_pattern)
    }

    /// Key pattern from a JSON object such as `{"a": 1, "b": -1}`.
    ///
    /// Returns None unless every value is 1 or -1.
    pub fn key_pattern_from_json(doc: &Json) -> Option<Vec<(String, i32)>> {
        let obj = doc.as_object()?;
        if obj.is_empty() {
            return None;
        }
        obj.iter()
            .map(|(field, dir)| match dir.as_f64() {
                Some(d) if d == 1.0 => Some((field.clone(), 1)),
                Some(d) if d == -1.0 => Some((field.clone(), -1)),
                _ => None,
            })
            .collect()
    }

    /// The key pattern as a JSON object.
    pub fn key_pattern_json(&self) -> Json {
        Json::Object(
            self.key_pattern
                .iter()
                .map(|(field, dir)| (field.clone(), Json::from(*dir)))
                .collect(),
        )
    }
}

/// Final bounds for one index field, in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBounds {
    pub field: String,
    pub direction: i32,
    pub oil: OrderedIntervalList,
    pub tightness: Tightness,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexBounds {
    pub fields: Vec<FieldBounds>,
}

impl IndexBounds {
    pub fn field(&self, name: &str) -> Option<&FieldBounds> {
        self.fields.iter().find(|f| f.field == name)
    }
}

impl fmt::Display for IndexBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, fb) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", fb.field, fb.oil)?;
        }
        write!(f, "}}")
    }
}

/// How to re-derive the bounds of one index field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecipe {
    pub field: String,
    pub direction: i32,
    pub iet: Iet,
    /// Tightness of the built bounds. Replayed bounds are never tighter:
    /// `$elemMatch` loosens its bounds without a node in the tree.
    pub tightness_floor: Tightness,
}

/// Per-field IETs for a cached index scan.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsRecipe {
    pub fields: Vec<FieldRecipe>,
}

impl BoundsRecipe {
    pub fn field(&self, name: &str) -> Option<&FieldRecipe> {
        self.fields.iter().find(|f| f.field == name)
    }
}

/// Build bounds and a replay recipe for `index` from a normalized,
/// parameterized filter.
pub fn build_index_bounds(
    filter: &MatchExpression,
    index: &IndexEntry,
    collator: Option<&dyn Collator>,
) -> (IndexBounds, BoundsRecipe) {
    let mut bounds = Vec::with_capacity(index.key_pattern.len());
    let mut recipe = Vec::with_capacity(index.key_pattern.len());

    for (field, direction) in &index.key_pattern {
        let predicates = predicates_on(filter, field);
        let mut builder = Builder::new();

        let mut iter = predicates.into_iter();
        let result = match iter.next() {
            Some(first) => {
                let mut acc = translate(first, collator, Some(&mut builder));
                for next in iter {
                    acc = translate_and_intersect(next, &acc, collator, Some(&mut builder));
                }
                acc
            }
            None => PredicateBounds::all_values(Tightness::Exact),
        };

        let iet = builder.done().unwrap_or_else(|| Iet::Const {
            oil: result.oil.clone(),
            tightness: result.tightness,
        });

        bounds.push(finish(field, *direction, result.oil, result.tightness));
        recipe.push(FieldRecipe {
            field: field.clone(),
            direction: *direction,
            iet,
            tightness_floor: result.tightness,
        });
    }

    (IndexBounds { fields: bounds }, BoundsRecipe { fields: recipe })
}

/// Re-derive index bounds from a recipe and new bindings.
pub fn replay(
    recipe: &BoundsRecipe,
    bindings: &InputParamBindings,
    collator: Option<&dyn Collator>,
) -> IetResult<IndexBounds> {
    let mut fields = Vec::with_capacity(recipe.fields.len());
    for fr in &recipe.fields {
        let out = evaluate(&fr.iet, bindings, collator)?;
        let tightness = out.tightness.looser(fr.tightness_floor);
        fields.push(finish(&fr.field, fr.direction, out.oil, tightness));
    }
    Ok(IndexBounds { fields })
}

fn finish(field: &str, direction: i32, oil: OrderedIntervalList, tightness: Tightness) -> FieldBounds {
    let oil = if direction < 0 { oil.reversed() } else { oil };
    FieldBounds {
        field: field.to_string(),
        direction,
        oil,
        tightness,
    }
}

/// Top-level predicates constraining `field`, in normalized order.
fn predicates_on<'a>(filter: &'a MatchExpression, field: &str) -> Vec<&'a MatchExpression> {
    match filter {
        MatchExpression::And(children) => children
            .iter()
            .filter(|c| predicate_field(c) == Some(field))
            .collect(),
        other if predicate_field(other) == Some(field) => vec![other],
        _ => Vec::new(),
    }
}

/// The single field a predicate constrains. An `$or` qualifies when all of
/// its branches constrain the same field.
fn predicate_field(expr: &MatchExpression) -> Option<&str> {
    match expr {
        MatchExpression::Or(children) => {
            let first = predicate_field(children.first()?)?;
            if children.iter().all(|c| predicate_field(c) == Some(first)) {
                Some(first)
            } else {
                None
            }
        }
        MatchExpression::And(_) | MatchExpression::Nor(_) => None,
        other => other.path(),
    }
}
