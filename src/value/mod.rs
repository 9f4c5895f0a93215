//! Document values and their index-key ordering
//!
//! Every comparison in the bounds and interval code goes through the single
//! total order defined here, so interval merging, intersection and
//! complement agree with each other.

mod json;
mod ordering;
mod types;

pub use json::{extended_literal, from_json, is_extended_literal, sorted_flags};
pub use ordering::{compare_values, no_value_between};
pub use types::{CanonicalType, Value};
