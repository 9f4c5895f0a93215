//! Per-shape index filters
//!
//! An index filter restricts the indexes the planner may consider for every
//! query of one shape. Filters live in memory only.

mod settings;

pub use settings::{AllowedIndex, AllowedIndexEntry, QuerySettings};
