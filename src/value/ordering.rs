//! Total order over document values
//!
//! Values compare by canonical type first, then within the type:
//! - Numbers compare numerically across int/double; NaN sorts below every
//!   other number and equals itself
//! - Strings compare bytewise
//! - Objects compare field by field (value type, then name, then value)
//! - Arrays compare element-wise; a prefix sorts first
//! - Regexes compare by pattern, then flags
//!
//! The order is total, so `Value` implements `Ord` and values can be used
//! directly as interval endpoints.

use std::cmp::Ordering;

use super::types::Value;

/// Compare two values under the index-key total order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let type_order = a.canonical_type().cmp(&b.canonical_type());
    if type_order != Ordering::Equal {
        return type_order;
    }

    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Int(x), Value::Double(y)) => compare_int_double(*x, *y),
        (Value::Double(x), Value::Int(y)) => compare_int_double(*y, *x).reverse(),
        (Value::Double(x), Value::Double(y)) => compare_doubles(*x, *y),
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (
            Value::Regex {
                pattern: p1,
                flags: f1,
            },
            Value::Regex {
                pattern: p2,
                flags: f2,
            },
        ) => p1.cmp(p2).then_with(|| f1.cmp(f2)),
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y),
        (Value::Object(x), Value::Object(y)) => compare_objects(x, y),
        // Singleton types (MinKey, MaxKey, Null, Undefined)
        _ => Ordering::Equal,
    }
}

fn compare_doubles(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an i64 against a double without lossy casts.
fn compare_int_double(i: i64, d: f64) -> Ordering {
    if d.is_nan() {
        return Ordering::Greater;
    }
    // 2^63 is exactly representable; i64::MAX is not
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if d >= TWO_POW_63 {
        return Ordering::Less;
    }
    if d < -TWO_POW_63 {
        return Ordering::Greater;
    }

    let truncated = d.trunc();
    match i.cmp(&(truncated as i64)) {
        Ordering::Equal => {
            let fract = d - truncated;
            if fract > 0.0 {
                Ordering::Less
            } else if fract < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

fn compare_arrays(x: &[Value], y: &[Value]) -> Ordering {
    for (a, b) in x.iter().zip(y.iter()) {
        let ord = compare_values(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    x.len().cmp(&y.len())
}

fn compare_objects(x: &[(String, Value)], y: &[(String, Value)]) -> Ordering {
    for ((ka, va), (kb, vb)) in x.iter().zip(y.iter()) {
        let ord = va
            .canonical_type()
            .cmp(&vb.canonical_type())
            .then_with(|| ka.as_bytes().cmp(kb.as_bytes()))
            .then_with(|| compare_values(va, vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    x.len().cmp(&y.len())
}

/// Returns true when no value lies strictly between `a` and `b`.
///
/// This holds when `a >= b`, or when `a` is the largest value of its type
/// and `b` is the smallest value of the following type (for example
/// `undefined` and `null`, or `inf.0` and `""`).
pub fn no_value_between(a: &Value, b: &Value) -> bool {
    if compare_values(a, b) != Ordering::Less {
        return true;
    }
    if !a.is_max_of_type() {
        return false;
    }
    match a.canonical_type().next() {
        Some(next) => compare_values(&next.min_value(), b) == Ordering::Equal,
        None => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare_values(self, other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_order() {
        let ordered = vec![
            Value::MinKey,
            Value::Undefined,
            Value::Null,
            Value::Double(f64::NAN),
            Value::Int(-5),
            Value::Double(2.5),
            Value::string(""),
            Value::string("abc"),
            Value::Object(vec![]),
            Value::Array(vec![]),
            Value::Bool(false),
            Value::Bool(true),
            Value::Date(0),
            Value::regex("a", ""),
            Value::MaxKey,
        ];
        for pair in ordered.windows(2) {
            assert_eq!(
                compare_values(&pair[0], &pair[1]),
                Ordering::Less,
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_numbers_compare_across_representations() {
        assert_eq!(compare_values(&Value::Int(10), &Value::Double(10.0)), Ordering::Equal);
        assert_eq!(compare_values(&Value::Int(10), &Value::Double(10.5)), Ordering::Less);
        assert_eq!(compare_values(&Value::Double(-0.5), &Value::Int(-1)), Ordering::Greater);
        assert_eq!(
            compare_values(&Value::Int(i64::MAX), &Value::Double(9.3e18)),
            Ordering::Less
        );
    }

    #[test]
    fn test_nan_below_all_numbers() {
        let nan = Value::Double(f64::NAN);
        assert_eq!(compare_values(&nan, &Value::Double(f64::NEG_INFINITY)), Ordering::Less);
        assert_eq!(compare_values(&nan, &Value::Int(i64::MIN)), Ordering::Less);
        assert_eq!(compare_values(&nan, &nan), Ordering::Equal);
    }

    #[test]
    fn test_array_prefix_sorts_first() {
        let short = Value::Array(vec![Value::Int(1)]);
        let long = Value::Array(vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(compare_values(&short, &long), Ordering::Less);
    }

    #[test]
    fn test_object_compares_field_types_first() {
        let num = Value::Object(vec![("z".into(), Value::Int(1))]);
        let s = Value::Object(vec![("a".into(), Value::string("x"))]);
        assert_eq!(compare_values(&num, &s), Ordering::Less);
    }

    #[test]
    fn test_no_value_between_adjacent_types() {
        assert!(no_value_between(&Value::Undefined, &Value::Null));
        assert!(no_value_between(&Value::MinKey, &Value::Undefined));
        assert!(no_value_between(&Value::Double(f64::INFINITY), &Value::string("")));
        assert!(!no_value_between(&Value::Null, &Value::Array(vec![])));
        assert!(!no_value_between(&Value::Int(1), &Value::Int(2)));
    }
}
