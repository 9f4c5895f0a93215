//! Bound-construction rules
//!
//! Each rule maps one predicate operator and its literal to an interval
//! list and a tightness. The bounds translator and the interval evaluation
//! tree evaluator both call these functions, so a cached plan replays
//! exactly the bounds a fresh translation would produce.

use super::interval::Interval;
use super::oil::OrderedIntervalList;
use super::Tightness;
use crate::query::{Collator, ComparisonOp};
use crate::value::{CanonicalType, Value};

/// Bounds for one predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateBounds {
    pub oil: OrderedIntervalList,
    pub tightness: Tightness,
}

impl PredicateBounds {
    pub fn new(intervals: Vec<Interval>, tightness: Tightness) -> Self {
        Self {
            oil: OrderedIntervalList::from_intervals(intervals),
            tightness,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Tightness::Exact)
    }

    pub fn all_values(tightness: Tightness) -> Self {
        Self::new(vec![Interval::all_values()], tightness)
    }
}

/// Map strings through the collator, if any.
pub fn collate(value: &Value, collator: Option<&dyn Collator>) -> Value {
    match collator {
        Some(c) => value.map_strings(&|s| c.comparison_key(s)),
        None => value.clone(),
    }
}

/// Bounds for `$eq/$lt/$lte/$gt/$gte` against `value`.
pub fn comparison_bounds(
    op: ComparisonOp,
    value: &Value,
    collator: Option<&dyn Collator>,
) -> PredicateBounds {
    let value = collate(value, collator);
    match op {
        ComparisonOp::Eq => equality_bounds(&value),
        ComparisonOp::Lt | ComparisonOp::Lte => upper_bounds(&value, op == ComparisonOp::Lte),
        ComparisonOp::Gt | ComparisonOp::Gte => lower_bounds(&value, op == ComparisonOp::Gte),
    }
}

/// Bounds for equality with an already-collated value.
fn equality_bounds(value: &Value) -> PredicateBounds {
    match value {
        // Null also matches missing fields, which index as undefined
        Value::Null => PredicateBounds::new(
            vec![Interval::point(Value::Undefined), Interval::point(Value::Null)],
            Tightness::InexactFetch,
        ),
        Value::Array(items) => {
            let first = match items.first() {
                Some(v) => Interval::point(v.clone()),
                None => Interval::point(Value::Undefined),
            };
            PredicateBounds::new(
                vec![first, Interval::point(value.clone())],
                Tightness::InexactFetch,
            )
        }
        other => PredicateBounds::new(vec![Interval::point(other.clone())], Tightness::Exact),
    }
}

/// `$lt` / `$lte`: a ray from the bottom of the value's type bracket.
fn upper_bounds(value: &Value, inclusive: bool) -> PredicateBounds {
    match value {
        Value::MaxKey => PredicateBounds::new(
            vec![Interval::new(Value::MinKey, true, Value::MaxKey, inclusive)],
            Tightness::Exact,
        ),
        Value::MinKey | Value::Null | Value::Undefined => {
            if inclusive {
                equality_bounds(value)
            } else {
                PredicateBounds::empty()
            }
        }
        Value::Double(d) if d.is_nan() => {
            if inclusive {
                equality_bounds(value)
            } else {
                PredicateBounds::empty()
            }
        }
        Value::Array(_) => PredicateBounds::all_values(Tightness::InexactFetch),
        other => {
            let start = if other.is_number() {
                Value::Double(f64::NEG_INFINITY)
            } else {
                other.canonical_type().min_value()
            };
            PredicateBounds::new(
                vec![Interval::new(start, true, other.clone(), inclusive)],
                Tightness::Exact,
            )
        }
    }
}

/// `$gt` / `$gte`: a ray to the top of the value's type bracket.
fn lower_bounds(value: &Value, inclusive: bool) -> PredicateBounds {
    match value {
        Value::MinKey => PredicateBounds::new(
            vec![Interval::new(Value::MinKey, inclusive, Value::MaxKey, true)],
            Tightness::Exact,
        ),
        Value::MaxKey | Value::Null | Value::Undefined => {
            if inclusive {
                equality_bounds(value)
            } else {
                PredicateBounds::empty()
            }
        }
        Value::Double(d) if d.is_nan() => {
            if inclusive {
                equality_bounds(value)
            } else {
                PredicateBounds::empty()
            }
        }
        Value::Array(_) => PredicateBounds::all_values(Tightness::InexactFetch),
        other => {
            let bracket = type_bracket(other.canonical_type());
            PredicateBounds::new(
                vec![Interval::new(
                    other.clone(),
                    inclusive,
                    bracket.end,
                    bracket.end_inclusive,
                )],
                Tightness::Exact,
            )
        }
    }
}

/// Bounds for `$in`. Regex elements match by pattern; every other element
/// matches by equality.
pub fn in_bounds(values: &[Value], collator: Option<&dyn Collator>) -> PredicateBounds {
    let mut intervals = Vec::new();
    let mut tightness = Tightness::Exact;

    for value in values {
        let bounds = match value {
            Value::Regex { .. } => regex_bounds(value),
            other => equality_bounds(&collate(other, collator)),
        };
        intervals.extend(bounds.oil.intervals().iter().cloned());
        tightness = tightness.looser(bounds.tightness);
    }

    PredicateBounds::new(intervals, tightness)
}

/// Bounds for `$regex`.
///
/// Never tighter than "any string", plus the regex value itself so stored
/// regex literals are found too.
pub fn regex_bounds(regex: &Value) -> PredicateBounds {
    let mut intervals = vec![type_bracket(CanonicalType::String)];
    if let Value::Regex { .. } = regex {
        intervals.push(Interval::point(regex.clone()));
    }
    PredicateBounds::new(intervals, Tightness::InexactFetch)
}

/// Every key of one canonical type.
///
/// Types without a maximum end just before the next type, exclusive.
pub fn type_bracket(t: CanonicalType) -> Interval {
    match t {
        CanonicalType::Array => Interval::all_values(),
        other => match other.max_value() {
            Some(max) => Interval::new(other.min_value(), true, max, true),
            None => {
                let next = other.next().map(|n| n.min_value()).unwrap_or(Value::MaxKey);
                Interval::new(other.min_value(), true, next, false)
            }
        },
    }
}

/// Bounds for `$type` over a set of canonical types.
pub fn type_set_bounds(types: &[CanonicalType]) -> PredicateBounds {
    // Array elements are indexed individually, so any key may match
    if types.contains(&CanonicalType::Array) {
        return PredicateBounds::all_values(Tightness::InexactFetch);
    }
    PredicateBounds::new(
        types.iter().map(|t| type_bracket(*t)).collect(),
        Tightness::Exact,
    )
}

/// Bounds for internal expression comparisons, which do not bracket by type.
pub fn internal_expr_bounds(op: ComparisonOp, value: &Value) -> PredicateBounds {
    let tightness = if matches!(value, Value::Array(_)) {
        Tightness::InexactFetch
    } else {
        Tightness::Exact
    };
    let interval = match op {
        ComparisonOp::Eq => Interval::point(value.clone()),
        ComparisonOp::Lt => Interval::new(Value::MinKey, true, value.clone(), false),
        ComparisonOp::Lte => Interval::new(Value::MinKey, true, value.clone(), true),
        ComparisonOp::Gt => Interval::new(value.clone(), false, Value::MaxKey, true),
        ComparisonOp::Gte => Interval::new(value.clone(), true, Value::MaxKey, true),
    };
    PredicateBounds::new(vec![interval], tightness)
}

/// Bounds for `$exists: true`.
pub fn exists_bounds() -> PredicateBounds {
    PredicateBounds::all_values(Tightness::InexactFetch)
}

/// Bounds for `$not: {$exists: true}`: missing fields index as null.
pub fn not_exists_bounds() -> PredicateBounds {
    PredicateBounds::new(vec![Interval::point(Value::Null)], Tightness::InexactFetch)
}

/// Bounds for `$mod`: any number.
pub fn mod_bounds() -> PredicateBounds {
    PredicateBounds::new(
        vec![type_bracket(CanonicalType::Number)],
        Tightness::InexactCovered,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(b: &PredicateBounds) -> String {
        b.oil.to_string()
    }

    #[test]
    fn test_numeric_rays() {
        let v = Value::Int(10);
        assert_eq!(render(&comparison_bounds(ComparisonOp::Lt, &v, None)), "[-inf.0, 10)");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Lte, &v, None)), "[-inf.0, 10]");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Gt, &v, None)), "(10, inf.0]");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Gte, &v, None)), "[10, inf.0]");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Eq, &v, None)), "[10, 10]");
    }

    #[test]
    fn test_string_rays_stay_in_type() {
        let v = Value::string("m");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Gt, &v, None)), "(\"m\", {})");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Lt, &v, None)), "[\"\", \"m\")");
    }

    #[test]
    fn test_null_equality_includes_undefined() {
        let b = comparison_bounds(ComparisonOp::Eq, &Value::Null, None);
        assert_eq!(render(&b), "[undefined, undefined] [null, null]");
        assert_eq!(b.tightness, Tightness::InexactFetch);
    }

    #[test]
    fn test_extrema_comparisons() {
        assert_eq!(
            render(&comparison_bounds(ComparisonOp::Lt, &Value::MaxKey, None)),
            "[MinKey, MaxKey)"
        );
        assert_eq!(render(&comparison_bounds(ComparisonOp::Gt, &Value::Null, None)), "");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Gt, &Value::MaxKey, None)), "");
    }

    #[test]
    fn test_nan_comparisons() {
        let nan = Value::Double(f64::NAN);
        assert_eq!(render(&comparison_bounds(ComparisonOp::Gte, &nan, None)), "[nan.0, nan.0]");
        assert_eq!(render(&comparison_bounds(ComparisonOp::Lt, &nan, None)), "");
    }

    #[test]
    fn test_in_dedups_and_sorts() {
        let b = in_bounds(&[Value::Int(15), Value::Int(5), Value::Double(5.0)], None);
        assert_eq!(render(&b), "[5, 5] [15, 15]");
        assert_eq!(b.tightness, Tightness::Exact);
    }

    #[test]
    fn test_in_with_regex_and_number() {
        let b = in_bounds(&[Value::regex("alpha", "i"), Value::Int(101)], None);
        assert_eq!(render(&b), "[101, 101] [\"\", {}) [/alpha/i, /alpha/i]");
        assert_eq!(b.tightness, Tightness::InexactFetch);
    }

    #[test]
    fn test_type_brackets() {
        assert_eq!(type_bracket(CanonicalType::Number).to_string(), "[nan.0, inf.0]");
        assert_eq!(type_bracket(CanonicalType::String).to_string(), "[\"\", {})");
        assert_eq!(
            render(&type_set_bounds(&[CanonicalType::String, CanonicalType::Number])),
            "[nan.0, inf.0] [\"\", {})"
        );
    }
}
