//! Administrative commands
//!
//! Thin layer over `QuerySettings` and `PlanCache`: validates command
//! documents and keeps the two consistent.

mod errors;
mod index_filter;

pub use errors::{CommandError, CommandResult};
pub use index_filter::{clear_filters, list_filters, set_filter};
