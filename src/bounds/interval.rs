//! Single bound intervals over the index-key order

use std::cmp::Ordering;
use std::fmt;

use crate::value::{compare_values, no_value_between, Value};

/// A contiguous range of index keys.
///
/// Intervals used in set operations are ascending (`start <= end`). Only
/// the final bounds for a descending key-pattern field are reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: Value,
    pub start_inclusive: bool,
    pub end: Value,
    pub end_inclusive: bool,
}

impl Interval {
    pub fn new(start: Value, start_inclusive: bool, end: Value, end_inclusive: bool) -> Self {
        Self {
            start,
            start_inclusive,
            end,
            end_inclusive,
        }
    }

    /// Closed single-value interval `[v, v]`
    pub fn point(value: Value) -> Self {
        Self::new(value.clone(), true, value, true)
    }

    /// `[MinKey, MaxKey]`
    pub fn all_values() -> Self {
        Self::new(Value::MinKey, true, Value::MaxKey, true)
    }

    pub fn is_all_values(&self) -> bool {
        self.start_inclusive
            && self.end_inclusive
            && matches!(self.start, Value::MinKey)
            && matches!(self.end, Value::MaxKey)
    }

    /// Returns true if no value falls inside this ascending interval.
    pub fn is_empty(&self) -> bool {
        match compare_values(&self.start, &self.end) {
            Ordering::Greater => true,
            Ordering::Equal => !(self.start_inclusive && self.end_inclusive),
            Ordering::Less => {
                !self.start_inclusive
                    && !self.end_inclusive
                    && no_value_between(&self.start, &self.end)
            }
        }
    }

    /// Intersection of two ascending intervals, or None if they are disjoint.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let (start, start_inclusive) = match compare_values(&self.start, &other.start) {
            Ordering::Greater => (self.start.clone(), self.start_inclusive),
            Ordering::Less => (other.start.clone(), other.start_inclusive),
            Ordering::Equal => (
                self.start.clone(),
                self.start_inclusive && other.start_inclusive,
            ),
        };
        let (end, end_inclusive) = match compare_values(&self.end, &other.end) {
            Ordering::Less => (self.end.clone(), self.end_inclusive),
            Ordering::Greater => (other.end.clone(), other.end_inclusive),
            Ordering::Equal => (self.end.clone(), self.end_inclusive && other.end_inclusive),
        };

        let result = Interval::new(start, start_inclusive, end, end_inclusive);
        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }

    /// Swap the endpoints, for scanning a descending index field.
    pub fn reversed(&self) -> Interval {
        Interval::new(
            self.end.clone(),
            self.end_inclusive,
            self.start.clone(),
            self.start_inclusive,
        )
    }

    /// Orders intervals by where they begin; an inclusive start sorts first.
    pub(crate) fn cmp_start(&self, other: &Interval) -> Ordering {
        compare_values(&self.start, &other.start)
            .then_with(|| other.start_inclusive.cmp(&self.start_inclusive))
    }

    /// Orders intervals by where they end; an exclusive end sorts first.
    pub(crate) fn cmp_end(&self, other: &Interval) -> Ordering {
        compare_values(&self.end, &other.end)
            .then_with(|| self.end_inclusive.cmp(&other.end_inclusive))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.start_inclusive { '[' } else { '(' },
            self.start,
            self.end,
            if self.end_inclusive { ']' } else { ')' }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let iv = Interval::new(Value::Int(1), false, Value::Int(10), false);
        assert_eq!(iv.to_string(), "(1, 10)");
        assert_eq!(Interval::all_values().to_string(), "[MinKey, MaxKey]");
    }

    #[test]
    fn test_empty_detection() {
        assert!(Interval::new(Value::Int(5), true, Value::Int(5), false).is_empty());
        assert!(Interval::new(Value::Int(6), true, Value::Int(5), true).is_empty());
        assert!(!Interval::point(Value::Int(5)).is_empty());
        // Nothing sorts strictly between undefined and null
        assert!(Interval::new(Value::Undefined, false, Value::Null, false).is_empty());
        assert!(!Interval::new(Value::Undefined, true, Value::Null, false).is_empty());
    }

    #[test]
    fn test_intersect_clips_both_sides() {
        let a = Interval::new(Value::Int(1), false, Value::Double(f64::INFINITY), true);
        let b = Interval::new(Value::Double(f64::NEG_INFINITY), true, Value::Int(10), false);
        let both = a.intersect(&b).unwrap();
        assert_eq!(both.to_string(), "(1, 10)");
    }

    #[test]
    fn test_intersect_disjoint() {
        let a = Interval::new(Value::Int(1), true, Value::Int(3), false);
        let b = Interval::new(Value::Int(3), true, Value::Int(5), true);
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn test_shared_endpoint_inclusivity() {
        let a = Interval::new(Value::Int(1), true, Value::Int(3), true);
        let b = Interval::new(Value::Int(3), true, Value::Int(5), true);
        assert_eq!(a.intersect(&b).unwrap(), Interval::point(Value::Int(3)));
    }
}
