//! Predicate to bounds translation
//!
//! Translates a predicate on one index field into an interval list and a
//! tightness. When an IET builder is supplied, every translation step also
//! records the matching tree node, so the bounds can be re-derived later
//! from new parameter values.

use super::rules::{self, PredicateBounds};
use super::Tightness;
use crate::iet::{Builder, EvalOp, InputParamId};
use crate::query::{BsonTypeTag, Collator, ComparisonOp, MatchExpression};
use crate::value::{CanonicalType, Value};

/// Translate one predicate.
pub fn translate(
    expr: &MatchExpression,
    collator: Option<&dyn Collator>,
    mut builder: Option<&mut Builder>,
) -> PredicateBounds {
    match expr {
        MatchExpression::Comparison {
            op, value, param, ..
        } => {
            let bounds = rules::comparison_bounds(*op, value, collator);
            record(builder, &bounds, param.map(|p| (op.eval_op(), p)));
            bounds
        }
        MatchExpression::In { values, param, .. } => {
            let bounds = rules::in_bounds(values, collator);
            record(builder, &bounds, param.map(|p| (EvalOp::In, p)));
            bounds
        }
        MatchExpression::Regex {
            pattern,
            flags,
            param,
            ..
        } => {
            let bounds = rules::regex_bounds(&Value::regex(pattern.clone(), flags.clone()));
            record(builder, &bounds, param.map(|p| (EvalOp::Regex, p)));
            bounds
        }
        MatchExpression::Exists { .. } => constant(builder, rules::exists_bounds()),
        MatchExpression::Type { types, .. } => constant(builder, type_bounds(types)),
        MatchExpression::Mod { .. } => constant(builder, rules::mod_bounds()),
        MatchExpression::InternalExpr { op, value, .. } => {
            let value = rules::collate(value, collator);
            constant(builder, rules::internal_expr_bounds(*op, &value))
        }
        MatchExpression::Not(child) => translate_not(child, collator, builder),
        MatchExpression::ElemMatchValue { children, .. } => {
            let mut iter = children.iter();
            let mut bounds = match iter.next() {
                Some(first) => translate(first, collator, builder.as_deref_mut()),
                None => return constant(builder, PredicateBounds::all_values(Tightness::InexactFetch)),
            };
            for child in iter {
                bounds = translate_and_intersect(child, &bounds, collator, builder.as_deref_mut());
            }
            // Whole-array values must be re-checked
            bounds.tightness = Tightness::InexactFetch;
            bounds
        }
        MatchExpression::And(children) => {
            let mut iter = children.iter();
            let mut bounds = match iter.next() {
                Some(first) => translate(first, collator, builder.as_deref_mut()),
                None => return constant(builder, PredicateBounds::all_values(Tightness::Exact)),
            };
            for child in iter {
                bounds = translate_and_intersect(child, &bounds, collator, builder.as_deref_mut());
            }
            bounds
        }
        MatchExpression::Or(children) => {
            let mut iter = children.iter();
            let mut bounds = match iter.next() {
                Some(first) => translate(first, collator, builder.as_deref_mut()),
                None => return constant(builder, PredicateBounds::empty()),
            };
            for child in iter {
                bounds = translate_and_union(child, &bounds, collator, builder.as_deref_mut());
            }
            bounds
        }
        MatchExpression::AlwaysFalse => constant(builder, PredicateBounds::empty()),
        MatchExpression::ElemMatchObject { .. }
        | MatchExpression::Nor(_)
        | MatchExpression::AlwaysTrue => {
            constant(builder, PredicateBounds::all_values(Tightness::InexactFetch))
        }
    }
}

/// Translate `expr` and intersect the result with `current`.
pub fn translate_and_intersect(
    expr: &MatchExpression,
    current: &PredicateBounds,
    collator: Option<&dyn Collator>,
    mut builder: Option<&mut Builder>,
) -> PredicateBounds {
    let next = translate(expr, collator, builder.as_deref_mut());
    if let Some(b) = builder {
        b.add_intersect();
    }
    PredicateBounds {
        oil: current.oil.intersect(&next.oil),
        tightness: current.tightness.looser(next.tightness),
    }
}

/// Translate `expr` and union the result with `current`.
pub fn translate_and_union(
    expr: &MatchExpression,
    current: &PredicateBounds,
    collator: Option<&dyn Collator>,
    mut builder: Option<&mut Builder>,
) -> PredicateBounds {
    let next = translate(expr, collator, builder.as_deref_mut());
    if let Some(b) = builder {
        b.add_union();
    }
    PredicateBounds {
        oil: current.oil.union(&next.oil),
        tightness: current.tightness.looser(next.tightness),
    }
}

fn translate_not(
    child: &MatchExpression,
    collator: Option<&dyn Collator>,
    mut builder: Option<&mut Builder>,
) -> PredicateBounds {
    if let MatchExpression::Exists { .. } = child {
        return constant(builder, rules::not_exists_bounds());
    }

    let inner = translate(child, collator, builder.as_deref_mut());
    if !complement_is_safe(child, &inner) {
        // Complementing an over-approximation would drop matching keys
        if let Some(b) = builder.as_deref_mut() {
            b.pop();
        }
        return constant(builder, PredicateBounds::all_values(Tightness::InexactFetch));
    }

    if let Some(b) = builder {
        b.add_complement();
    }
    PredicateBounds {
        oil: inner.oil.complement(),
        tightness: if inner.tightness == Tightness::Exact {
            Tightness::Exact
        } else {
            Tightness::InexactFetch
        },
    }
}

/// Exact bounds complement exactly. Inexact bounds from null or empty-array
/// equality still complement safely: a document that is not equal to null
/// or `[]` has no key inside those points.
fn complement_is_safe(child: &MatchExpression, bounds: &PredicateBounds) -> bool {
    if bounds.tightness == Tightness::Exact {
        return true;
    }
    let safe_element = |v: &Value| match v {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => !matches!(v, Value::Regex { .. }),
    };
    match child {
        MatchExpression::Comparison {
            op: ComparisonOp::Eq,
            value,
            ..
        } => matches!(value, Value::Null) || matches!(value, Value::Array(items) if items.is_empty()),
        MatchExpression::In { values, .. } => values.iter().all(safe_element),
        _ => false,
    }
}

fn type_bounds(types: &[BsonTypeTag]) -> PredicateBounds {
    let mut classes: Vec<CanonicalType> = types.iter().map(BsonTypeTag::canonical_type).collect();
    classes.sort();
    classes.dedup();

    let mut bounds = rules::type_set_bounds(&classes);
    // A single numeric type shares its bracket with the others
    let narrow_numeric = types.iter().any(|t| {
        matches!(
            t,
            BsonTypeTag::Double | BsonTypeTag::Int | BsonTypeTag::Long | BsonTypeTag::Decimal
        )
    });
    if narrow_numeric {
        bounds.tightness = bounds.tightness.looser(Tightness::InexactCovered);
    }
    bounds
}

fn record(
    builder: Option<&mut Builder>,
    bounds: &PredicateBounds,
    eval: Option<(EvalOp, InputParamId)>,
) {
    if let Some(b) = builder {
        match eval {
            Some((op, param)) => b.add_eval(op, param),
            None => b.add_const(bounds.oil.clone(), bounds.tightness),
        }
    }
}

fn constant(builder: Option<&mut Builder>, bounds: PredicateBounds) -> PredicateBounds {
    record(builder, &bounds, None);
    bounds
}
