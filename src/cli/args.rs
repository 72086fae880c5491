//! CLI argument definitions using clap
//!
//! Commands:
//! - tabstore inspect --session <path>
//! - tabstore replay --session <path> [--restore-active] [--target-url <url>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabstore - A deterministic, incremental tab-session restore engine
#[derive(Parser, Debug)]
#[command(name = "tabstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a session manifest without restoring anything
    Inspect {
        /// Path to the session manifest
        #[arg(long, default_value = "./session.json")]
        session: PathBuf,
    },

    /// Drive a full restore episode over a session manifest
    Replay {
        /// Path to the session manifest
        #[arg(long, default_value = "./session.json")]
        session: PathBuf,

        /// Restore the active record synchronously before the batch pass
        #[arg(long)]
        restore_active: bool,

        /// Restore this URL out of band before starting the batch pass
        #[arg(long)]
        target_url: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
