//! Contracts of the stores the replay engine talks to
//!
//! The source hands out a forward-only cursor over a revision range. The
//! destination hands out a writer that stages change-sets and commits them.
//! A change-set reaches the destination as one unit or not at all.

use crate::event::{is_concrete, ChangeSet, Revision};

use super::errors::{StoreError, StoreResult};

/// Forward-only cursor over change-sets.
pub trait ChangeSetReader {
    /// Returns the next change-set, `None` once the range is exhausted.
    fn read(&mut self) -> StoreResult<Option<ChangeSet>>;

    /// Releases the cursor. Reading after close fails.
    fn close(&mut self) -> StoreResult<()>;
}

/// A store whose history can be read.
pub trait SourceStore {
    /// Opens a cursor over change-sets with `start <= revision < stop`.
    fn read_change_sets(&self, start: Revision, stop: Revision) -> StoreResult<Box<dyn ChangeSetReader + '_>>;
}

/// Sink of a destination store.
pub trait ReplayWriter {
    /// Stages a change-set. A change-set carrying a commit marker closes the
    /// current unit; the writer may commit it right away.
    fn write(&mut self, change_set: ChangeSet) -> StoreResult<()>;

    /// Commits everything staged so far.
    fn flush(&mut self) -> StoreResult<()>;

    /// Commits remaining data and releases the writer. Must be called exactly once.
    fn close(&mut self) -> StoreResult<()>;

    /// Discards staged data and releases the writer. Used instead of
    /// [`ReplayWriter::close`] when a run fails, so the destination stays at
    /// the last commit.
    fn abort(&mut self) -> StoreResult<()>;

    /// Revision of the last change-set that was durably committed.
    fn last_committed(&self) -> Revision;
}

/// A store that accepts replayed history.
pub trait DestinationStore {
    /// Highest committed revision, `0` for an empty store.
    fn last_revision(&self) -> StoreResult<Revision>;

    /// Opens a writer that appends after `last_revision`.
    fn replay_writer(&mut self) -> StoreResult<Box<dyn ReplayWriter + '_>>;
}

/// Checks that committed revisions strictly increase.
///
/// Sentinel revisions (unassigned, current) are exempt.
pub(crate) fn check_order(last_committed: Revision, change_set: &ChangeSet) -> StoreResult<()> {
    if change_set.is_committed() && is_concrete(change_set.revision) && change_set.revision <= last_committed {
        return Err(StoreError::OutOfOrder {
            last_committed,
            revision: change_set.revision,
        });
    }
    Ok(())
}
