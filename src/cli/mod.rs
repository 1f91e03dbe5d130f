// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::{Cli, Command, ServeArgs, SweepArgs};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Values not given on the command line are taken from the environment (after
/// `.env` has been loaded) and then from the built-in defaults. On invalid
/// arguments or `--help`, clap prints a message and exits the process.
pub fn parse_args() -> Cli {
    Cli::parse()
}
