//! aeroplan CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`, exiting non-zero on
//! failure. The error document has already been written to stdout.

use aeroplan::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
