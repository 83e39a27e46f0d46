//! In-memory store
//!
//! Serves as both source and destination. Used by tests and dry runs.

use crate::event::{is_concrete, ChangeSet, Revision};

use super::contract::{check_order, ChangeSetReader, DestinationStore, ReplayWriter, SourceStore};
use super::errors::{StoreError, StoreResult};

/// Change-sets held in a vector, in commit order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    change_sets: Vec<ChangeSet>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given history.
    pub fn from_change_sets(change_sets: Vec<ChangeSet>) -> Self {
        Self { change_sets }
    }

    /// The stored history.
    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }

    /// Consume the store into its history.
    pub fn into_change_sets(self) -> Vec<ChangeSet> {
        self.change_sets
    }

    /// Revisions of all stored change-sets, in order.
    pub fn revisions(&self) -> Vec<Revision> {
        self.change_sets.iter().map(|cs| cs.revision).collect()
    }

    fn highest_committed(&self) -> Revision {
        self.change_sets
            .iter()
            .filter(|cs| cs.is_committed() && is_concrete(cs.revision))
            .map(|cs| cs.revision)
            .max()
            .unwrap_or(0)
    }
}

impl SourceStore for MemoryStore {
    fn read_change_sets(&self, start: Revision, stop: Revision) -> StoreResult<Box<dyn ChangeSetReader + '_>> {
        Ok(Box::new(MemoryReader {
            change_sets: &self.change_sets,
            position: 0,
            start,
            stop,
            closed: false,
        }))
    }
}

impl DestinationStore for MemoryStore {
    fn last_revision(&self) -> StoreResult<Revision> {
        Ok(self.highest_committed())
    }

    fn replay_writer(&mut self) -> StoreResult<Box<dyn ReplayWriter + '_>> {
        let last_committed = self.highest_committed();
        Ok(Box::new(MemoryWriter {
            store: self,
            staged: Vec::new(),
            last_committed,
            closed: false,
        }))
    }
}

struct MemoryReader<'a> {
    change_sets: &'a [ChangeSet],
    position: usize,
    start: Revision,
    stop: Revision,
    closed: bool,
}

impl ChangeSetReader for MemoryReader<'_> {
    fn read(&mut self) -> StoreResult<Option<ChangeSet>> {
        if self.closed {
            return Err(StoreError::Closed("reader"));
        }
        while let Some(cs) = self.change_sets.get(self.position) {
            self.position += 1;
            if cs.revision >= self.start && cs.revision < self.stop {
                return Ok(Some(cs.clone()));
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> StoreResult<()> {
        self.closed = true;
        Ok(())
    }
}

struct MemoryWriter<'a> {
    store: &'a mut MemoryStore,
    staged: Vec<ChangeSet>,
    last_committed: Revision,
    closed: bool,
}

impl ReplayWriter for MemoryWriter<'_> {
    fn write(&mut self, change_set: ChangeSet) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed("writer"));
        }
        let committed = change_set.is_committed();
        self.staged.push(change_set);
        if committed {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        let mut last = self.last_committed;
        for cs in &self.staged {
            check_order(last, cs)?;
            if cs.is_committed() && is_concrete(cs.revision) {
                last = cs.revision;
            }
        }
        self.store.change_sets.append(&mut self.staged);
        self.last_committed = last;
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed("writer"));
        }
        self.flush()?;
        self.closed = true;
        Ok(())
    }

    fn abort(&mut self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed("writer"));
        }
        self.staged.clear();
        self.closed = true;
        Ok(())
    }

    fn last_committed(&self) -> Revision {
        self.last_committed
    }
}
