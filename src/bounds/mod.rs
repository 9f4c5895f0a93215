//! Index bounds for aeroplan
//!
//! Intervals, ordered interval lists, and the translation of predicates
//! into per-field bounds.
//!
//! # Design Principles
//!
//! - One total order: every comparison goes through `value::compare_values`
//! - Normalized lists: an `OrderedIntervalList` is always sorted and disjoint
//! - Shared rules: fresh translation and cached-plan replay use the same
//!   bound-construction functions in `rules`

mod index_bounds;
mod interval;
mod oil;
pub mod rules;
mod translate;

pub use index_bounds::{
    build_index_bounds, replay, BoundsRecipe, FieldBounds, FieldRecipe, IndexBounds, IndexEntry,
};
pub use interval::Interval;
pub use oil::OrderedIntervalList;
pub use translate::{translate, translate_and_intersect, translate_and_union};

use serde::{Deserialize, Serialize};

/// How exactly a set of bounds captures its predicate.
///
/// Ordered from tightest to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tightness {
    /// Keys inside the bounds match the predicate exactly
    Exact,
    /// The predicate must be re-checked, but the index key suffices
    InexactCovered,
    /// The predicate must be re-checked against the fetched document
    InexactFetch,
}

impl Tightness {
    /// The looser of two tightness values
    pub fn looser(self, other: Tightness) -> Tightness {
        self.max(other)
    }
}
