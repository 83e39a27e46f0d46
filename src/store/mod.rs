//! Source and destination stores
//!
//! The replay engine reads history from a [`SourceStore`] and writes the
//! rewritten history through a [`ReplayWriter`] obtained from a
//! [`DestinationStore`]. Two implementations exist:
//! - [`MemoryStore`], for tests and dry runs
//! - [`JsonlStore`], a checksummed JSON-lines file with fsync at commit

mod checksum;
mod contract;
mod errors;
mod jsonl;
mod memory;

pub use checksum::{compute_checksum, verify_checksum};
pub use contract::{ChangeSetReader, DestinationStore, ReplayWriter, SourceStore};
pub use errors::{StoreError, StoreResult};
pub use jsonl::{JsonlReader, JsonlStore, JsonlWriter};
pub use memory::MemoryStore;
