//! CLI command implementations

use std::io;
use std::path::Path;

use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::event::{CURRENT_REVISION, FIRST_REVISION};
use crate::replay::{ReplayConfig, ReplaySession};
use crate::store::{ChangeSetReader, JsonlStore, SourceStore};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{write_line, write_response};

/// Parse arguments, install logging and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    run_command(cli.command)
}

/// Logs go to stderr; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Replay { config, dry_run } => replay(&config, dry_run),
        Command::Check { config } => check(&config),
        Command::Dump { store, from, to } => dump(&store, from, to),
    }
}

/// Replay the configured source into the destination and print the stats
pub fn replay(config_path: &Path, dry_run: bool) -> CliResult<()> {
    let config = ReplayConfig::load(config_path)?;
    let session = ReplaySession::prepare(config)?;
    let stats = session.execute(dry_run)?;
    write_response(&json!({ "dry_run": dry_run, "stats": stats }))
}

/// Validate configuration, schemas and pipeline without touching any store
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = ReplayConfig::load(config_path)?;
    let stages = config.rewriters.len();
    let session = ReplaySession::prepare(config)?;
    session.build_pipeline(session.config().start_revision)?;
    info!(stages, "Configuration is valid");
    write_response(&json!({ "valid": true, "stages": stages }))
}

/// Print change-sets of a store, one JSON document per line
pub fn dump(store_path: &Path, from: Option<i64>, to: Option<i64>) -> CliResult<()> {
    let store = JsonlStore::open_existing(store_path)?;
    let mut reader = store.read_change_sets(from.unwrap_or(FIRST_REVISION), to.unwrap_or(CURRENT_REVISION))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = dump_all(reader.as_mut(), &mut out);
    reader.close()?;
    result
}

fn dump_all(reader: &mut dyn ChangeSetReader, out: &mut impl io::Write) -> CliResult<()> {
    while let Some(change_set) = reader.read()? {
        write_line(out, &change_set)?;
    }
    Ok(())
}
