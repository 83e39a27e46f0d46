//! history-replay - streaming rewrite and replay of versioned object store history
//!
//! History is read one change-set at a time from a source store, passed
//! through a chain of rewriters and written to a destination store:
//! - `event` - change-sets and the events they own
//! - `schema` - type registry consulted by rewriters
//! - `store` - source and destination stores
//! - `rewrite` - rewriter contract, stacking, filtering, declarative chains
//! - `visit` - per-event dispatch with apply/skip outcomes
//! - `revision` - revision renumbering
//! - `branch` - branch id remapping and branched-type filtering
//! - `rename` - type and attribute renaming, type exclusion
//! - `replay` - configuration, identity translation and the replay driver
//! - `cli` - command-line entry points

pub mod branch;
pub mod cli;
pub mod event;
pub mod rename;
pub mod replay;
pub mod revision;
pub mod rewrite;
pub mod schema;
pub mod store;
pub mod visit;
