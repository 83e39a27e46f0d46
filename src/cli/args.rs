//! CLI argument definitions using clap
//!
//! Commands:
//! - history-replay replay --config <path> [--dry-run]
//! - history-replay check --config <path>
//! - history-replay dump --store <path> [--from N] [--to N]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// history-replay - rewrite and replay the change history of a versioned object store
#[derive(Parser, Debug)]
#[command(name = "history-replay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at DEBUG instead of INFO
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay the source history into the destination
    Replay {
        /// Path to the replay configuration
        #[arg(long, default_value = "./replay.json")]
        config: PathBuf,

        /// Run the pipeline without writing to the destination
        #[arg(long)]
        dry_run: bool,
    },

    /// Load configuration and schemas and build the pipeline, then exit
    Check {
        /// Path to the replay configuration
        #[arg(long, default_value = "./replay.json")]
        config: PathBuf,
    },

    /// Print the change-sets of a store as JSON lines
    Dump {
        /// Path to the store file
        #[arg(long)]
        store: PathBuf,

        /// First revision to print
        #[arg(long)]
        from: Option<i64>,

        /// Revision to stop before
        #[arg(long)]
        to: Option<i64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
