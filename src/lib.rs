//! aeroplan - query plan cache and interval evaluation trees
//!
//! Caches the winning plan of each query shape and re-derives its index
//! bounds from every new query's literals without replanning.
//!
//! # Modules
//!
//! - `value`: document values and their canonical total order
//! - `bounds`: intervals, ordered interval lists, predicate translation
//! - `iet`: interval evaluation trees, their builder and evaluator
//! - `query`: filter parsing, normalization, parameterization, shapes
//! - `plan_cache`: keys, entries and the bounded LRU cache
//! - `query_settings`: per-shape index filters
//! - `commands`: index filter administration
//! - `observability`: structured logging and cache counters
//! - `cli`: command-line inspection tool

pub mod bounds;
pub mod cli;
pub mod commands;
pub mod iet;
pub mod observability;
pub mod plan_cache;
pub mod query;
pub mod query_settings;
pub mod value;
