//! Query model for aeroplan
//!
//! Parses filter documents into match expressions, normalizes them, and
//! assigns input parameter slots to their literals.
//!
//! # Pipeline
//!
//! 1. `parse_filter`: JSON filter to `MatchExpression`
//! 2. `normalize`: flatten, collapse and order predicates
//! 3. `parameterize`: assign slots in pre-order
//!
//! `CanonicalQuery::canonicalize` runs all three and validates sort,
//! projection and collation.

mod canonical;
mod collation;
mod errors;
mod expression;
mod normalize;
mod parameterize;
mod parser;
mod shape;

pub use canonical::{CanonicalQuery, FindCommand};
pub use collation::{
    collator_for, CollationSpec, Collator, ReverseStringCollator, MOCK_REVERSE_STRING_LOCALE,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use expression::{BsonTypeTag, ComparisonOp, MatchExpression, MatchType};
pub use normalize::normalize;
pub use parameterize::{extract_bindings, parameterize};
pub use parser::parse_filter;
pub use shape::{encode_filter_shape, LiteralMode};
