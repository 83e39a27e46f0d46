//! CLI module for history-replay
//!
//! Provides command-line interface for:
//! - replay: run a configured replay
//! - check: validate a configuration without running it
//! - dump: print a store's change-sets

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, dump, replay, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{write_line, write_response};
