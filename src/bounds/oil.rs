//! Ordered interval lists
//!
//! An `OrderedIntervalList` holds ascending, disjoint intervals for one
//! index field. Every constructor normalizes: empty intervals are dropped,
//! the rest are sorted by start, and overlapping or touching intervals are
//! coalesced.

use std::cmp::Ordering;
use std::fmt;

use super::interval::Interval;
use crate::value::{compare_values, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedIntervalList {
    intervals: Vec<Interval>,
}

impl OrderedIntervalList {
    /// An empty list (matches nothing)
    pub fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Build a normalized list from arbitrary intervals.
    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut intervals: Vec<Interval> =
            intervals.into_iter().filter(|iv| !iv.is_empty()).collect();
        intervals.sort_by(|a, b| a.cmp_start(b));

        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for next in intervals {
            match merged.last_mut() {
                Some(cur) if touches(cur, &next) => {
                    if next.cmp_end(cur) == Ordering::Greater {
                        cur.end = next.end;
                        cur.end_inclusive = next.end_inclusive;
                    }
                }
                _ => merged.push(next),
            }
        }

        Self { intervals: merged }
    }

    /// `[MinKey, MaxKey]`
    pub fn all_values() -> Self {
        Self {
            intervals: vec![Interval::all_values()],
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// True if the list is exactly `[MinKey, MaxKey]`.
    pub fn is_all_values(&self) -> bool {
        self.intervals.len() == 1 && self.intervals[0].is_all_values()
    }

    /// Set union of two lists.
    pub fn union(&self, other: &OrderedIntervalList) -> OrderedIntervalList {
        Self::from_intervals(self.intervals.iter().chain(other.intervals.iter()).cloned())
    }

    /// Set intersection of two lists.
    pub fn intersect(&self, other: &OrderedIntervalList) -> OrderedIntervalList {
        let (a, b) = (&self.intervals, &other.intervals);
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            if let Some(iv) = a[i].intersect(&b[j]) {
                out.push(iv);
            }
            match a[i].cmp_end(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }

        Self { intervals: out }
    }

    /// Complement over the full domain `[MinKey, MaxKey]`.
    ///
    /// Produces the gaps before, between and after the intervals. Gaps that
    /// contain no value, such as `(undefined, null)`, are omitted.
    pub fn complement(&self) -> OrderedIntervalList {
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        let mut cursor = Value::MinKey;
        let mut cursor_inclusive = true;

        for iv in &self.intervals {
            let gap = Interval::new(cursor, cursor_inclusive, iv.start.clone(), !iv.start_inclusive);
            if !gap.is_empty() {
                out.push(gap);
            }
            cursor = iv.end.clone();
            cursor_inclusive = !iv.end_inclusive;
        }

        let tail = Interval::new(cursor, cursor_inclusive, Value::MaxKey, true);
        if !tail.is_empty() {
            out.push(tail);
        }

        Self { intervals: out }
    }

    /// Intervals in scan order for a descending index field.
    ///
    /// The result is no longer ascending and must not be fed back into set
    /// operations.
    pub fn reversed(&self) -> OrderedIntervalList {
        Self {
            intervals: self.intervals.iter().rev().map(Interval::reversed).collect(),
        }
    }
}

/// Whether `next` (which starts at or after `cur`) overlaps or touches `cur`.
fn touches(cur: &Interval, next: &Interval) -> bool {
    match compare_values(&next.start, &cur.end) {
        Ordering::Less => true,
        Ordering::Equal => next.start_inclusive || cur.end_inclusive,
        Ordering::Greater => false,
    }
}

impl fmt::Display for OrderedIntervalList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", iv)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(a: i64, b: i64) -> Interval {
        Interval::new(Value::Int(a), true, Value::Int(b), true)
    }

    fn open(a: i64, b: i64) -> Interval {
        Interval::new(Value::Int(a), false, Value::Int(b), false)
    }

    #[test]
    fn test_normalize_sorts_and_merges() {
        let oil = OrderedIntervalList::from_intervals(vec![
            closed(10, 12),
            closed(1, 3),
            closed(2, 5),
            Interval::point(Value::Int(7)),
        ]);
        assert_eq!(oil.to_string(), "[1, 5] [7, 7] [10, 12]");
    }

    #[test]
    fn test_touching_intervals_merge_only_when_endpoint_included() {
        let merged = OrderedIntervalList::from_intervals(vec![
            Interval::new(Value::Int(1), true, Value::Int(5), false),
            closed(5, 9),
        ]);
        assert_eq!(merged.to_string(), "[1, 9]");

        let apart = OrderedIntervalList::from_intervals(vec![open(1, 5), open(5, 9)]);
        assert_eq!(apart.to_string(), "(1, 5) (5, 9)");
    }

    #[test]
    fn test_duplicate_points_collapse() {
        let oil = OrderedIntervalList::from_intervals(vec![
            Interval::point(Value::Int(5)),
            Interval::point(Value::Double(5.0)),
        ]);
        assert_eq!(oil.len(), 1);
    }

    #[test]
    fn test_intersect() {
        let a = OrderedIntervalList::from_intervals(vec![closed(1, 5), closed(8, 12)]);
        let b = OrderedIntervalList::from_intervals(vec![closed(4, 9), closed(11, 20)]);
        assert_eq!(a.intersect(&b).to_string(), "[4, 5] [8, 9] [11, 12]");
    }

    #[test]
    fn test_intersect_with_empty_is_empty() {
        let a = OrderedIntervalList::from_intervals(vec![closed(1, 5)]);
        assert!(a.intersect(&OrderedIntervalList::new()).is_empty());
    }

    #[test]
    fn test_complement_includes_domain_edges() {
        let oil = OrderedIntervalList::from_intervals(vec![closed(1, 5)]);
        assert_eq!(oil.complement().to_string(), "[MinKey, 1) (5, MaxKey]");
    }

    #[test]
    fn test_complement_of_everything_and_nothing() {
        assert!(OrderedIntervalList::all_values().complement().is_empty());
        assert!(OrderedIntervalList::new().complement().is_all_values());
    }

    #[test]
    fn test_complement_skips_empty_gaps() {
        let oil = OrderedIntervalList::from_intervals(vec![
            Interval::point(Value::Undefined),
            Interval::point(Value::Null),
            Interval::point(Value::Array(vec![])),
        ]);
        assert_eq!(
            oil.complement().to_string(),
            "[MinKey, undefined) (null, []) ([], MaxKey]"
        );
    }

    #[test]
    fn test_double_complement_round_trips() {
        let oil = OrderedIntervalList::from_intervals(vec![open(1, 5), closed(7, 9)]);
        assert_eq!(oil.complement().complement(), oil);
    }

    #[test]
    fn test_reversed() {
        let oil = OrderedIntervalList::from_intervals(vec![
            Interval::new(Value::Int(1), true, Value::Int(3), false),
            closed(5, 6),
        ]);
        assert_eq!(oil.reversed().to_string(), "[6, 5] (3, 1]");
    }
}
