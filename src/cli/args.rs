//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroplan iet --filter <json> [--index <json>]
//! - aeroplan key --filter <json> [--sort <json>] [--projection <json>] [--collation <json>] [--namespace <ns>]
//! - aeroplan eval --filter <json> --replay <json> [--index <json>]
//! - aeroplan config-check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aeroplan - query plan cache and interval evaluation tree inspector
#[derive(Parser, Debug)]
#[command(name = "aeroplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Minimum log severity (TRACE, INFO, WARN, ERROR, FATAL)
    #[arg(long, global = true, default_value = "INFO")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the per-field IETs and bounds built for a filter
    Iet {
        /// Filter document
        #[arg(long)]
        filter: String,

        /// Index key pattern, e.g. '{"a": 1, "b": -1}'. Defaults to the
        /// filter's top-level fields, ascending.
        #[arg(long)]
        index: Option<String>,
    },

    /// Print the plan cache key and hashes for a query
    Key {
        /// Filter document
        #[arg(long)]
        filter: String,

        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        projection: Option<String>,

        #[arg(long)]
        collation: Option<String>,

        /// Collection namespace
        #[arg(long, default_value = "test.coll")]
        namespace: String,
    },

    /// Build bounds for one filter, then replay them with another
    /// filter's literals
    Eval {
        /// Filter the recipe is built from
        #[arg(long)]
        filter: String,

        /// Filter of the same shape whose literals are replayed
        #[arg(long)]
        replay: String,

        /// Index key pattern (see `iet`)
        #[arg(long)]
        index: Option<String>,
    },

    /// Validate a plan cache configuration file
    ConfigCheck {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroplan.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iet() {
        let cli = Cli::parse_from(["aeroplan", "iet", "--filter", r#"{"a": 1}"#]);
        assert_eq!(cli.log_level, "INFO");
        match cli.command {
            Command::Iet { filter, index } => {
                assert_eq!(filter, r#"{"a": 1}"#);
                assert!(index.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_key_defaults() {
        let cli = Cli::parse_from(["aeroplan", "key", "--filter", "{}", "--log-level", "TRACE"]);
        assert_eq!(cli.log_level, "TRACE");
        match cli.command {
            Command::Key { namespace, sort, .. } => {
                assert_eq!(namespace, "test.coll");
                assert!(sort.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
