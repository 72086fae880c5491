//! CLI module for tabstore
//!
//! Provides the command-line interface for:
//! - inspect: summarize a session manifest
//! - replay: drive a full restore episode over a manifest

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{inspect, replay, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
