//! CLI module for aeroplan
//!
//! Provides command-line inspection of:
//! - iet: per-field interval evaluation trees and bounds for a filter
//! - key: plan cache key and hashes for a query
//! - eval: replay of cached bounds with new literals
//! - config-check: plan cache configuration validation

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check_config, describe_iet, describe_key, describe_replay, run, run_command,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
