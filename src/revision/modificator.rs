//! Revision renumbering
//!
//! Keeps the output stream on a canonical timeline while revisions are
//! dropped from or inserted into the input. Every processed commit advances
//! `expected_revision`. Incoming revisions are shifted by
//! `current_modification`; revisions referenced from payload values are
//! shifted by the modification that applied when they were written, looked up
//! in the [`ModificationTable`].
//!
//! Sentinel revisions (unassigned, current) are never touched.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{
    is_concrete, BranchEvent, ChangeSet, CommitEvent, ItemCreation, ItemDeletion, ItemUpdate, Revision, Value,
    Values, CURRENT_REVISION,
};
use crate::rewrite::{EventRewriter, EventSink, RewriteError, RewriteResult};
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

use super::attributes::RevisionAttributes;
use super::modification::ModificationTable;

/// How incoming revisions relate to the canonical timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Infer drops and inserts from gaps and repeats in the input.
    Auto,
    /// Input is original history; shift everything by the current modification.
    Replay,
    /// Input is synthetic; revisions are taken as they are.
    FakingHistory,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Auto => "auto",
            Mode::Replay => "replay",
            Mode::FakingHistory => "faking-history",
        })
    }
}

pub struct RevisionModificator {
    attributes: RevisionAttributes,
    table: ModificationTable,
    expected_revision: Revision,
    next_input_revision: Revision,
    current_modification: i64,
    last_modification: i64,
    mode: Mode,
}

impl RevisionModificator {
    /// Creates an engine in replay mode expecting `start_revision` next.
    pub fn new(attributes: RevisionAttributes, start_revision: Revision) -> Self {
        Self {
            attributes,
            table: ModificationTable::new(),
            expected_revision: start_revision,
            next_input_revision: start_revision,
            current_modification: 0,
            last_modification: 0,
            mode: Mode::Replay,
        }
    }

    pub fn expected_revision(&self) -> Revision {
        self.expected_revision
    }

    pub fn next_input_revision(&self) -> Revision {
        self.next_input_revision
    }

    pub fn current_modification(&self) -> i64 {
        self.current_modification
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn modifications(&self) -> &ModificationTable {
        &self.table
    }

    /// Switches the mode.
    ///
    /// Entering auto or replay records the modification changes made since
    /// the last switch: a single boundary for inserts, one boundary per
    /// dropped revision for drops.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        debug!(from = %self.mode, to = %mode, expected = self.expected_revision, "Revision mode change");
        self.mode = mode;

        if mode == Mode::FakingHistory {
            return;
        }
        if mode == Mode::Auto {
            self.next_input_revision = self.expected_revision - self.current_modification;
        }
        if self.last_modification < self.current_modification {
            self.table
                .add(self.expected_revision - self.current_modification, self.current_modification);
            self.last_modification = self.current_modification;
        } else {
            while self.last_modification > self.current_modification {
                self.last_modification -= 1;
                self.table
                    .add(self.expected_revision - self.last_modification - 1, self.last_modification);
            }
        }
    }

    /// Announces `count` revisions of the input that will never arrive.
    pub fn drop_revisions(&mut self, count: i64) -> RewriteResult<()> {
        if self.mode != Mode::FakingHistory {
            return Err(RewriteError::InvalidState(format!(
                "revisions can only be dropped in faking-history mode, mode is {}",
                self.mode
            )));
        }
        if count <= 0 {
            return Err(RewriteError::InvalidArgument(format!(
                "number of dropped revisions must be positive, got {}",
                count
            )));
        }
        debug!(count, expected = self.expected_revision, "Dropping revisions");
        self.current_modification -= count;
        Ok(())
    }

    pub fn drop_revision(&mut self) -> RewriteResult<()> {
        self.drop_revisions(1)
    }

    /// Aligns the engine so that input revision `next_input_revision` lands
    /// on `expected_revision`.
    pub fn adopt(&mut self, next_input_revision: Revision) {
        self.current_modification = self.expected_revision - next_input_revision;
        self.next_input_revision = next_input_revision;
        if self.current_modification != self.last_modification {
            self.table.add(next_input_revision, self.current_modification);
            self.last_modification = self.current_modification;
        }
        debug!(
            modification = self.current_modification,
            expected = self.expected_revision,
            "Adopted destination"
        );
    }

    /// Maps a revision referenced from payload data to the new timeline.
    pub fn modify_revision(&self, revision: Revision) -> RewriteResult<Revision> {
        if revision == CURRENT_REVISION {
            return Ok(revision);
        }
        let modification = self.modification_for(revision)?;
        shift("revision", revision, modification)
    }

    fn modification_for(&self, revision: Revision) -> RewriteResult<i64> {
        let shifted = revision
            .checked_add(self.current_modification)
            .ok_or(RewriteError::InvalidRemap {
                what: "revision",
                value: revision,
                modification: self.current_modification,
            })?;
        if shifted == self.expected_revision {
            return Ok(self.current_modification);
        }
        if shifted > self.expected_revision {
            return Err(RewriteError::FutureRevision {
                revision: shifted,
                expected: self.expected_revision,
            });
        }
        Ok(self.table.value_at(revision))
    }

    fn detect_gap(&mut self, incoming: Revision) -> RewriteResult<()> {
        let diff = incoming - self.next_input_revision;
        if diff > 0 {
            self.set_mode(Mode::FakingHistory);
            self.drop_revisions(diff)?;
            self.set_mode(Mode::Auto);
        } else if diff < 0 {
            debug!(revision = incoming, inserted = -diff, "Inserted revisions detected");
            self.current_modification -= diff;
            self.table.clear_from(incoming);
            if self.table.value_at(incoming) != self.current_modification {
                self.table.add(incoming, self.current_modification);
            }
            self.last_modification = self.current_modification;
        }
        self.next_input_revision = incoming + 1;
        Ok(())
    }

    fn check_revision(&self, what: &'static str, revision: &mut Revision) -> RewriteResult<()> {
        if !is_concrete(*revision) {
            return Ok(());
        }
        if self.mode != Mode::FakingHistory {
            *revision = shift(what, *revision, self.current_modification)?;
        }
        if *revision != self.expected_revision {
            return Err(RewriteError::Desynchronized {
                what,
                expected: self.expected_revision,
                actual: *revision,
            });
        }
        Ok(())
    }

    fn rewrite_values(&mut self, type_name: &str, object: &str, values: &mut Values) -> RewriteResult<()> {
        let revision_attributes = self.attributes.for_type(type_name);
        for (name, value) in values.iter_mut() {
            match value {
                Value::Key(key) => {
                    key.history_context = self.modify_revision(key.history_context)?;
                }
                _ if !revision_attributes.contains(name) => {}
                Value::Int(revision) => {
                    *revision = self.modify_revision(*revision)?;
                }
                Value::Null | Value::NextCommitNumber => {}
                other => {
                    return Err(RewriteError::InvalidValue {
                        attribute: name.clone(),
                        object: object.to_string(),
                        found: other.kind(),
                    })
                }
            }
        }
        Ok(())
    }

    fn rewrites_payload(&self, revision: Revision) -> bool {
        is_concrete(revision) && self.mode != Mode::FakingHistory
    }
}

/// `value + modification`, failing when the sum overflows or is negative.
fn shift(what: &'static str, value: i64, modification: i64) -> RewriteResult<i64> {
    value
        .checked_add(modification)
        .filter(|shifted| *shifted >= 0)
        .ok_or(RewriteError::InvalidRemap {
            what,
            value,
            modification,
        })
}

impl EventVisitor for RevisionModificator {
    fn begin(&mut self, change_set: &mut ChangeSet) -> RewriteResult<()> {
        let incoming = change_set.revision;
        if !is_concrete(incoming) {
            return Ok(());
        }
        if self.mode == Mode::Auto {
            self.detect_gap(incoming)?;
        }
        self.check_revision("change-set", &mut change_set.revision)
    }

    fn visit_branch(&mut self, event: &mut BranchEvent) -> RewriteResult<Outcome> {
        if self.rewrites_payload(event.revision) {
            let base = event.base_revision_number;
            let modification = self.modification_for(base)?;
            if modification != 0 {
                event.base_revision_number = shift("base revision", base, modification)?;
            }
        }
        self.check_revision("branch event", &mut event.revision)?;
        Ok(Outcome::Apply)
    }

    fn visit_deletion(&mut self, event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        self.check_revision("deletion", &mut event.revision)?;
        Ok(Outcome::Apply)
    }

    fn visit_creation(&mut self, event: &mut ItemCreation) -> RewriteResult<Outcome> {
        if self.rewrites_payload(event.revision) {
            let object = event.object_id.to_string();
            self.rewrite_values(&event.object_id.object_type, &object, &mut event.values)?;
        }
        self.check_revision("creation", &mut event.revision)?;
        Ok(Outcome::Apply)
    }

    fn visit_update(&mut self, event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        if self.rewrites_payload(event.revision) {
            let object = event.object_id.to_string();
            self.rewrite_values(&event.object_id.object_type, &object, &mut event.values)?;
            if let Some(old_values) = event.old_values.as_mut() {
                self.rewrite_values(&event.object_id.object_type, &object, old_values)?;
            }
        }
        self.check_revision("update", &mut event.revision)?;
        Ok(Outcome::Apply)
    }

    fn visit_commit(&mut self, event: &mut CommitEvent) -> RewriteResult<Outcome> {
        if !is_concrete(event.revision) {
            return Ok(Outcome::Apply);
        }
        self.check_revision("commit", &mut event.revision)?;
        self.expected_revision += 1;
        if self.mode == Mode::FakingHistory {
            self.current_modification += 1;
        }
        Ok(Outcome::Apply)
    }
}

impl EventRewriter for RevisionModificator {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}

impl fmt::Debug for RevisionModificator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevisionModificator")
            .field("mode", &self.mode)
            .field("expected_revision", &self.expected_revision)
            .field("current_modification", &self.current_modification)
            .field("modifications", &format_args!("{}", self.table))
            .finish()
    }
}
