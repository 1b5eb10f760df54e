//! Command implementations for the vcfquery CLI
//!
//! Each command is implemented in its own module; this module dispatches
//! to the appropriate handler based on the parsed CLI args.

pub mod convert;
pub mod count;
pub mod filter;
pub mod shared;
pub mod validate;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Main command runner for vcfquery
///
/// Dispatches to the subcommand handlers:
/// - `filter`: predicate filtering with native or projected output
/// - `count`: group-by and labeled-tally aggregations
/// - `convert`: delimiter rewriting and header relabeling
/// - `validate`: well-formedness report over the whole stream
///
/// Returns the process exit code: zero on success (including zero
/// matching records), non-zero when the input or the query is invalid.
pub fn run(args: Args) -> Result<i32> {
    match args.get_command() {
        Commands::Filter(filter_args) => filter::run_filter(filter_args),
        Commands::Count(count_args) => count::run_count(count_args),
        Commands::Convert(convert_args) => convert::run_convert(convert_args),
        Commands::Validate(validate_args) => validate::run_validate(validate_args),
    }
}
