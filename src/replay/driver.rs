//! Replay driver
//!
//! Pulls change-sets from a source, pushes each through the rewriter chain
//! and the mandatory identity translation, and hands the result to the
//! destination writer.
//!
//! Guarantees:
//! - one change-set is processed completely before the next is read
//! - reader and writer are closed on every exit path
//! - on failure staged data is discarded, so the destination stays at the
//!   last committed change-set

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::event::{is_concrete, ChangeSet, Revision, CURRENT_REVISION, FIRST_REVISION};
use crate::rewrite::{EventRewriter, EventSink, RewriteResult};
use crate::store::{ChangeSetReader, DestinationStore, ReplayWriter, SourceStore};

use super::errors::ReplayResult;
use super::translate::IdentityTranslator;

/// Tunables of one run.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub start_revision: Revision,
    pub stop_revision: Revision,
    pub large_change_set_threshold: usize,
    /// Log progress every this many change-sets; 0 disables
    pub progress_interval: u64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            start_revision: FIRST_REVISION,
            stop_revision: CURRENT_REVISION,
            large_change_set_threshold: 1000,
            progress_interval: 1000,
        }
    }
}

/// Statistics of a replay run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub change_sets_read: u64,
    pub change_sets_written: u64,
    pub events_read: u64,
    pub events_written: u64,
    /// Events dropped because their type is unknown to the destination
    pub events_skipped: u64,
    /// Last revision committed to the destination, 0 if none
    pub last_revision: Revision,
}

pub struct ReplayDriver {
    options: ReplayOptions,
}

impl ReplayDriver {
    pub fn new(options: ReplayOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    /// Replays `[start_revision, stop_revision)` of `source` into `destination`.
    pub fn run(
        &self,
        source: &dyn SourceStore,
        destination: &mut dyn DestinationStore,
        rewriter: &mut dyn EventRewriter,
        translator: &mut IdentityTranslator,
    ) -> ReplayResult<ReplayStats> {
        info!(
            start = self.options.start_revision,
            stop = self.options.stop_revision,
            "Starting replay"
        );

        let mut reader = source.read_change_sets(self.options.start_revision, self.options.stop_revision)?;
        let mut writer = match destination.replay_writer() {
            Ok(writer) => writer,
            Err(e) => {
                if let Err(close_err) = reader.close() {
                    warn!(error = %close_err, "Failed to close source reader");
                }
                return Err(e.into());
            }
        };

        let mut stats = ReplayStats::default();
        let outcome = self.pump(reader.as_mut(), writer.as_mut(), rewriter, translator, &mut stats);

        let finished = match &outcome {
            Ok(()) => writer.close(),
            Err(e) => {
                error!(code = e.code(), error = %e, last_committed = writer.last_committed(), "Replay failed");
                writer.abort()
            }
        };
        let closed = reader.close();

        stats.events_skipped = translator.skipped();
        stats.last_revision = writer.last_committed();

        outcome?;
        finished?;
        closed?;

        info!(
            change_sets = stats.change_sets_written,
            events = stats.events_written,
            skipped = stats.events_skipped,
            last_revision = stats.last_revision,
            "Replay complete"
        );
        Ok(stats)
    }

    fn pump(
        &self,
        reader: &mut dyn ChangeSetReader,
        writer: &mut dyn ReplayWriter,
        rewriter: &mut dyn EventRewriter,
        translator: &mut IdentityTranslator,
        stats: &mut ReplayStats,
    ) -> ReplayResult<()> {
        while let Some(change_set) = reader.read()? {
            stats.change_sets_read += 1;
            stats.events_read += change_set.event_count() as u64;
            self.log_large(&change_set);

            let revision = change_set.revision;
            let mut sink = TranslatingSink {
                translator: &mut *translator,
                out: WriterSink {
                    writer: &mut *writer,
                    stats: &mut *stats,
                },
            };
            rewriter.rewrite(change_set, &mut sink)?;
            debug!(revision, "Change-set replayed");

            let interval = self.options.progress_interval;
            if interval > 0 && stats.change_sets_read % interval == 0 {
                info!(
                    read = stats.change_sets_read,
                    written = stats.change_sets_written,
                    revision,
                    "Replay progress"
                );
            }
        }
        Ok(())
    }

    fn log_large(&self, change_set: &ChangeSet) {
        if change_set.event_count() <= self.options.large_change_set_threshold {
            return;
        }
        info!(
            revision = change_set.revision,
            branches = change_set.branch_events.len(),
            deletions = change_set.deletions.len(),
            creations = change_set.creations.len(),
            updates = change_set.updates.len(),
            "Large change-set"
        );
    }
}

/// Runs the identity translation in front of the writer.
struct TranslatingSink<'a> {
    translator: &'a mut IdentityTranslator,
    out: WriterSink<'a>,
}

impl EventSink for TranslatingSink<'_> {
    fn write(&mut self, change_set: ChangeSet) -> RewriteResult<()> {
        self.translator.rewrite(change_set, &mut self.out)
    }
}

struct WriterSink<'a> {
    writer: &'a mut dyn ReplayWriter,
    stats: &'a mut ReplayStats,
}

impl EventSink for WriterSink<'_> {
    fn write(&mut self, change_set: ChangeSet) -> RewriteResult<()> {
        let events = change_set.event_count() as u64;
        let committed = change_set.is_committed() && is_concrete(change_set.revision);
        self.writer.write(change_set)?;
        self.stats.change_sets_written += 1;
        self.stats.events_written += events;
        if committed {
            self.stats.last_revision = self.writer.last_committed();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CommitEvent, ItemCreation, ObjectBranchId, TRUNK_BRANCH};
    use crate::replay::translate::UnknownTypePolicy;
    use crate::rewrite::{FnRewriter, IdentityRewriter, RewriteError};
    use crate::schema::{SchemaRegistry, TypeDescriptor};
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use chrono::Utc;
    use std::cell::Cell;
    use std::rc::Rc;

    fn history(revisions: &[Revision]) -> MemoryStore {
        MemoryStore::from_change_sets(
            revisions
                .iter()
                .map(|rev| {
                    ChangeSet::new(*rev)
                        .with_creation(ItemCreation::new(*rev, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d")))
                        .with_commit(CommitEvent::new(*rev, "tester", Utc::now()))
                })
                .collect(),
        )
    }

    fn translator() -> IdentityTranslator {
        let registry = SchemaRegistry::from_types(vec![TypeDescriptor::new("Doc")]).unwrap();
        IdentityTranslator::new(&registry, UnknownTypePolicy::Fail)
    }

    #[test]
    fn test_copies_history() {
        let source = history(&[1, 2, 3]);
        let mut destination = MemoryStore::new();
        let driver = ReplayDriver::new(ReplayOptions::default());

        let stats = driver
            .run(&source, &mut destination, &mut IdentityRewriter, &mut translator())
            .unwrap();

        assert_eq!(destination.change_sets(), source.change_sets());
        assert_eq!(stats.change_sets_read, 3);
        assert_eq!(stats.change_sets_written, 3);
        assert_eq!(stats.events_written, 6);
        assert_eq!(stats.last_revision, 3);
    }

    #[test]
    fn test_failure_keeps_last_commit() {
        let source = history(&[1, 2, 3]);
        let mut destination = MemoryStore::new();
        let driver = ReplayDriver::new(ReplayOptions::default());
        let mut failing = FnRewriter(|cs: ChangeSet, sink: &mut dyn EventSink| {
            if cs.revision == 3 {
                return Err(RewriteError::InvalidState("boom".into()));
            }
            sink.write(cs)
        });

        let err = driver
            .run(&source, &mut destination, &mut failing, &mut translator())
            .unwrap_err();
        assert_eq!(err.code(), "HR_REWRITE_INVALID_STATE");
        assert_eq!(destination.revisions(), vec![1, 2]);
    }

    struct TrackedSource {
        inner: MemoryStore,
        closed: Rc<Cell<bool>>,
    }

    struct TrackedReader<'a> {
        inner: Box<dyn ChangeSetReader + 'a>,
        closed: Rc<Cell<bool>>,
    }

    impl ChangeSetReader for TrackedReader<'_> {
        fn read(&mut self) -> StoreResult<Option<ChangeSet>> {
            self.inner.read()
        }

        fn close(&mut self) -> StoreResult<()> {
            self.closed.set(true);
            self.inner.close()
        }
    }

    impl SourceStore for TrackedSource {
        fn read_change_sets(&self, start: Revision, stop: Revision) -> StoreResult<Box<dyn ChangeSetReader + '_>> {
            Ok(Box::new(TrackedReader {
                inner: self.inner.read_change_sets(start, stop)?,
                closed: Rc::clone(&self.closed),
            }))
        }
    }

    #[test]
    fn test_reader_closed_on_error() {
        let source = TrackedSource {
            inner: history(&[1, 2]),
            closed: Rc::new(Cell::new(false)),
        };
        // destination already holds revision 2, so revision 1 arrives out of order
        let mut destination = history(&[2]);
        let driver = ReplayDriver::new(ReplayOptions::default());

        let err = driver
            .run(&source, &mut destination, &mut IdentityRewriter, &mut translator())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::replay::ReplayError::Rewrite(RewriteError::Sink(StoreError::OutOfOrder { .. }))
        ));
        assert!(source.closed.get());
        assert_eq!(destination.revisions(), vec![2]);
    }

    #[test]
    fn test_range_is_honored() {
        let source = history(&[1, 2, 3, 4]);
        let mut destination = MemoryStore::new();
        let driver = ReplayDriver::new(ReplayOptions {
            start_revision: 2,
            stop_revision: 4,
            ..ReplayOptions::default()
        });
        driver
            .run(&source, &mut destination, &mut IdentityRewriter, &mut translator())
            .unwrap();
        assert_eq!(destination.revisions(), vec![2, 3]);
    }
}
