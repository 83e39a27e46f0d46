//! Visitor callbacks and change-set traversal

use crate::event::{BranchEvent, ChangeSet, CommitEvent, EventMut, ItemCreation, ItemDeletion, ItemUpdate};
use crate::rewrite::{EventSink, RewriteResult};

/// Verdict of a visitor on one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep the event, possibly mutated in place.
    Apply,
    /// Drop the event from the change-set.
    Skip,
}

/// Callbacks for each event kind. Every default keeps the event.
pub trait EventVisitor {
    /// Called once per change-set before any event is visited.
    fn begin(&mut self, _change_set: &mut ChangeSet) -> RewriteResult<()> {
        Ok(())
    }

    fn visit_branch(&mut self, _event: &mut BranchEvent) -> RewriteResult<Outcome> {
        Ok(Outcome::Apply)
    }

    fn visit_deletion(&mut self, _event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        Ok(Outcome::Apply)
    }

    fn visit_creation(&mut self, _event: &mut ItemCreation) -> RewriteResult<Outcome> {
        Ok(Outcome::Apply)
    }

    fn visit_update(&mut self, _event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        Ok(Outcome::Apply)
    }

    fn visit_commit(&mut self, _event: &mut CommitEvent) -> RewriteResult<Outcome> {
        Ok(Outcome::Apply)
    }
}

/// Routes one event to the matching callback.
pub fn dispatch<V: EventVisitor + ?Sized>(visitor: &mut V, event: EventMut<'_>) -> RewriteResult<Outcome> {
    match event {
        EventMut::Branch(e) => visitor.visit_branch(e),
        EventMut::Deletion(e) => visitor.visit_deletion(e),
        EventMut::Creation(e) => visitor.visit_creation(e),
        EventMut::Update(e) => visitor.visit_update(e),
        EventMut::Commit(e) => visitor.visit_commit(e),
    }
}

/// Rebuilds `events` from those the visitor applies, preserving order.
fn retain_applied<V, E, F>(visitor: &mut V, events: Vec<E>, view: F) -> RewriteResult<Vec<E>>
where
    V: EventVisitor + ?Sized,
    F: Fn(&mut E) -> EventMut<'_>,
{
    let mut kept = Vec::with_capacity(events.len());
    for mut event in events {
        if dispatch(visitor, view(&mut event))? == Outcome::Apply {
            kept.push(event);
        }
    }
    Ok(kept)
}

/// Visits every event of `change_set` in processing order, dropping the
/// skipped ones.
pub fn visit_change_set<V: EventVisitor + ?Sized>(visitor: &mut V, change_set: &mut ChangeSet) -> RewriteResult<()> {
    visitor.begin(change_set)?;

    let branches = std::mem::take(&mut change_set.branch_events);
    change_set.branch_events = retain_applied(visitor, branches, |e| EventMut::Branch(e))?;

    let deletions = std::mem::take(&mut change_set.deletions);
    change_set.deletions = retain_applied(visitor, deletions, |e| EventMut::Deletion(e))?;

    let creations = std::mem::take(&mut change_set.creations);
    change_set.creations = retain_applied(visitor, creations, |e| EventMut::Creation(e))?;

    let updates = std::mem::take(&mut change_set.updates);
    let mut updates = retain_applied(visitor, updates, |e| EventMut::Update(e))?;
    updates.retain(|u| !u.values.is_empty());
    change_set.updates = updates;

    if let Some(mut commit) = change_set.commit.take() {
        if dispatch(visitor, EventMut::Commit(&mut commit))? == Outcome::Apply {
            change_set.commit = Some(commit);
        }
    }
    Ok(())
}

/// Visits `change_set` and writes the result to `sink`.
pub fn rewrite_visiting<V: EventVisitor + ?Sized>(
    visitor: &mut V,
    mut change_set: ChangeSet,
    sink: &mut dyn EventSink,
) -> RewriteResult<()> {
    visit_change_set(visitor, &mut change_set)?;
    sink.write(change_set)
}
