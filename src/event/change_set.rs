//! ChangeSet - one atomic unit of history
//!
//! A change-set owns its events in four ordered groups plus an optional commit
//! marker. The group order is fixed:
//!
//! branches → deletions → creations → updates → commit
//!
//! Deletions precede creations so an identity can be deleted and recreated
//! (with a different attribute shape) inside one revision.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::branch::BranchEvent;
use super::commit::CommitEvent;
use super::ids::{ObjectBranchId, Revision};
use super::item::{ItemCreation, ItemDeletion, ItemUpdate};

/// Discriminant of the five event kinds, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Branch,
    Deletion,
    Creation,
    Update,
    Commit,
}

impl EventKind {
    /// Lower-case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Branch => "branch",
            EventKind::Deletion => "deletion",
            EventKind::Creation => "creation",
            EventKind::Update => "update",
            EventKind::Commit => "commit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned event of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KnowledgeEvent {
    Branch(BranchEvent),
    Deletion(ItemDeletion),
    Creation(ItemCreation),
    Update(ItemUpdate),
    Commit(CommitEvent),
}

impl KnowledgeEvent {
    pub fn kind(&self) -> EventKind {
        self.view().kind()
    }

    pub fn revision(&self) -> Revision {
        self.view().revision()
    }

    pub fn view(&self) -> EventRef<'_> {
        match self {
            KnowledgeEvent::Branch(e) => EventRef::Branch(e),
            KnowledgeEvent::Deletion(e) => EventRef::Deletion(e),
            KnowledgeEvent::Creation(e) => EventRef::Creation(e),
            KnowledgeEvent::Update(e) => EventRef::Update(e),
            KnowledgeEvent::Commit(e) => EventRef::Commit(e),
        }
    }
}

/// Borrowed view of one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRef<'a> {
    Branch(&'a BranchEvent),
    Deletion(&'a ItemDeletion),
    Creation(&'a ItemCreation),
    Update(&'a ItemUpdate),
    Commit(&'a CommitEvent),
}

impl<'a> EventRef<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            EventRef::Branch(_) => EventKind::Branch,
            EventRef::Deletion(_) => EventKind::Deletion,
            EventRef::Creation(_) => EventKind::Creation,
            EventRef::Update(_) => EventKind::Update,
            EventRef::Commit(_) => EventKind::Commit,
        }
    }

    pub fn revision(&self) -> Revision {
        match self {
            EventRef::Branch(e) => e.revision,
            EventRef::Deletion(e) => e.revision,
            EventRef::Creation(e) => e.revision,
            EventRef::Update(e) => e.revision,
            EventRef::Commit(e) => e.revision,
        }
    }

    /// The touched object, for item events.
    pub fn object_id(&self) -> Option<&'a ObjectBranchId> {
        match self {
            EventRef::Deletion(e) => Some(&e.object_id),
            EventRef::Creation(e) => Some(&e.object_id),
            EventRef::Update(e) => Some(&e.object_id),
            EventRef::Branch(_) | EventRef::Commit(_) => None,
        }
    }
}

/// Mutable view of one event, handed to visitors.
#[derive(Debug)]
pub enum EventMut<'a> {
    Branch(&'a mut BranchEvent),
    Deletion(&'a mut ItemDeletion),
    Creation(&'a mut ItemCreation),
    Update(&'a mut ItemUpdate),
    Commit(&'a mut CommitEvent),
}

/// One atomic unit of history, usually one commit of the source store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Revision of this change-set in its source timeline
    pub revision: Revision,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_events: Vec<BranchEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deletions: Vec<ItemDeletion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creations: Vec<ItemCreation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<ItemUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitEvent>,
}

impl ChangeSet {
    /// Create an empty change-set for the given revision.
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            branch_events: Vec::new(),
            deletions: Vec::new(),
            creations: Vec::new(),
            updates: Vec::new(),
            commit: None,
        }
    }

    /// Deep copy used when a rewriter forks the stream.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Route an owned event into its group. A second commit replaces the first.
    pub fn add(&mut self, event: KnowledgeEvent) {
        match event {
            KnowledgeEvent::Branch(e) => self.branch_events.push(e),
            KnowledgeEvent::Deletion(e) => self.deletions.push(e),
            KnowledgeEvent::Creation(e) => self.creations.push(e),
            KnowledgeEvent::Update(e) => self.updates.push(e),
            KnowledgeEvent::Commit(e) => self.commit = Some(e),
        }
    }

    pub fn with_branch(mut self, event: BranchEvent) -> Self {
        self.branch_events.push(event);
        self
    }

    pub fn with_deletion(mut self, event: ItemDeletion) -> Self {
        self.deletions.push(event);
        self
    }

    pub fn with_creation(mut self, event: ItemCreation) -> Self {
        self.creations.push(event);
        self
    }

    pub fn with_update(mut self, event: ItemUpdate) -> Self {
        self.updates.push(event);
        self
    }

    pub fn with_commit(mut self, event: CommitEvent) -> Self {
        self.commit = Some(event);
        self
    }

    /// All events in processing order.
    pub fn events(&self) -> impl Iterator<Item = EventRef<'_>> {
        self.branch_events
            .iter()
            .map(EventRef::Branch)
            .chain(self.deletions.iter().map(EventRef::Deletion))
            .chain(self.creations.iter().map(EventRef::Creation))
            .chain(self.updates.iter().map(EventRef::Update))
            .chain(self.commit.iter().map(EventRef::Commit))
    }

    /// Number of events including the commit marker.
    pub fn event_count(&self) -> usize {
        self.branch_events.len()
            + self.deletions.len()
            + self.creations.len()
            + self.updates.len()
            + usize::from(self.commit.is_some())
    }

    /// True if no event at all is left.
    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    /// True if this change-set closes a revision.
    pub fn is_committed(&self) -> bool {
        self.commit.is_some()
    }

    /// Consume the change-set into its events, in processing order.
    pub fn into_events(self) -> Vec<KnowledgeEvent> {
        let mut events = Vec::with_capacity(self.event_count());
        events.extend(self.branch_events.into_iter().map(KnowledgeEvent::Branch));
        events.extend(self.deletions.into_iter().map(KnowledgeEvent::Deletion));
        events.extend(self.creations.into_iter().map(KnowledgeEvent::Creation));
        events.extend(self.updates.into_iter().map(KnowledgeEvent::Update));
        events.extend(self.commit.into_iter().map(KnowledgeEvent::Commit));
        events
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChangeSet[r{}: {} branch, {} del, {} new, {} upd{}]",
            self.revision,
            self.branch_events.len(),
            self.deletions.len(),
            self.creations.len(),
            self.updates.len(),
            if self.commit.is_some() { ", committed" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ids::ObjectBranchId;
    use chrono::Utc;

    #[test]
    fn test_add_routes_into_canonical_order() {
        let id = ObjectBranchId::new(1, "Doc", "d1");
        let mut cs = ChangeSet::new(4);
        cs.add(KnowledgeEvent::Commit(CommitEvent::new(4, "alice", Utc::now())));
        cs.add(KnowledgeEvent::Update(ItemUpdate::new(4, id.clone(), false).with_value("a", 1, 2)));
        cs.add(KnowledgeEvent::Creation(ItemCreation::new(4, id.clone())));
        cs.add(KnowledgeEvent::Deletion(ItemDeletion::new(4, id)));
        cs.add(KnowledgeEvent::Branch(BranchEvent::new(4, 2, 1, 3)));

        let kinds: Vec<_> = cs.events().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Branch,
                EventKind::Deletion,
                EventKind::Creation,
                EventKind::Update,
                EventKind::Commit
            ]
        );
        assert_eq!(cs.event_count(), 5);
    }

    #[test]
    fn test_copy_is_independent() {
        let id = ObjectBranchId::new(1, "Doc", "d1");
        let original = ChangeSet::new(2).with_creation(ItemCreation::new(2, id).with_value("title", "x"));
        let mut copy = original.copy();
        copy.creations[0].values.clear();

        assert_eq!(original.creations[0].values.len(), 1);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_json_round_trip_keeps_groups() {
        let id = ObjectBranchId::new(1, "Doc", "d1");
        let cs = ChangeSet::new(7)
            .with_deletion(ItemDeletion::new(7, id.clone()))
            .with_creation(ItemCreation::new(7, id));
        let json = serde_json::to_string(&cs).unwrap();
        let back: ChangeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cs);
    }
}
