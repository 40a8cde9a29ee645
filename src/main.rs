//! # clause-retention
//!
//! `clause-retention` runs the clause retention classifier outside of a solver: it
//! classifies dumped clause records, inspects and exports models, and generates sample
//! records.
//!
//! ## Usage
//!
//! ```sh
//! clause-retention [-d] [--no-stats] <SUBCOMMAND>
//! ```
//!
//! ### Subcommands
//!
//! 1.  **`classify`**: Classify a JSON-lines record file, or every `.jsonl` file under a
//!     directory, and print one keep bit per record.
//!     ```sh
//!     clause-retention classify dumps/ --parallel
//!     clause-retention classify pass.jsonl --model model.json --votes
//!     ```
//!
//! 2.  **`inspect`**: Print per-tree shapes, feature usage and unused features.
//!     ```sh
//!     clause-retention inspect --model model.json
//!     ```
//!
//! 3.  **`export`**: Write the reference model as a JSON model file.
//!     ```sh
//!     clause-retention export --output reference.json
//!     ```
//!
//! 4.  **`sample`**: Write random records for a simulated reduction pass.
//!     ```sh
//!     clause-retention sample --count 10000 --seed 7 --output pass.jsonl
//!     ```
//!
//! 5.  **`completions`**: Generate shell completion scripts.
//!
//! `-d, --debug` enables debug logging; `RUST_LOG` overrides the level.

use crate::command_line::cli::{Cli, run};
use clap::Parser;
use log::LevelFilter;

mod command_line;

/// Global allocator using `tikv-jemallocator` for potentially better performance
/// and memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Main entry point.
///
/// Parses command-line arguments, sets up logging and dispatches to the command handler.
/// Failures are reported on standard error with exit status 1.
fn main() {
    let cli = Cli::parse();

    let level = if cli.common.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
