//! Predicate-guarded rewriting
//!
//! A filtered rewriter only sees change-sets matching its predicate. All
//! others go to the sink untouched and the wrapped rewriter is not invoked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::event::{ChangeSet, EventKind, Revision};

use super::errors::RewriteResult;
use super::rewriter::EventRewriter;
use super::sink::EventSink;

/// Applies `inner` only where `predicate` holds.
pub struct FilterRewriter<P> {
    predicate: P,
    inner: Box<dyn EventRewriter>,
}

impl<P> FilterRewriter<P>
where
    P: FnMut(&ChangeSet) -> bool,
{
    pub fn new(predicate: P, inner: Box<dyn EventRewriter>) -> Self {
        Self { predicate, inner }
    }
}

impl<P> EventRewriter for FilterRewriter<P>
where
    P: FnMut(&ChangeSet) -> bool,
{
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        if (self.predicate)(&change_set) {
            self.inner.rewrite(change_set, sink)
        } else {
            sink.write(change_set)
        }
    }
}

/// Declarative change-set predicates usable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "kebab-case")]
pub enum ChangeSetPredicate {
    /// `from <= revision < to`; either bound may be omitted.
    RevisionRange {
        #[serde(default)]
        from: Option<Revision>,
        #[serde(default)]
        to: Option<Revision>,
    },
    /// The change-set carries a commit marker.
    Committed,
    /// The change-set contains at least one event of the kind.
    Contains { event: EventKind },
    /// Some item event touches one of the types.
    TouchesTypes { types: BTreeSet<String> },
    Not { predicate: Box<ChangeSetPredicate> },
    All { predicates: Vec<ChangeSetPredicate> },
    Any { predicates: Vec<ChangeSetPredicate> },
}

impl ChangeSetPredicate {
    pub fn matches(&self, change_set: &ChangeSet) -> bool {
        match self {
            ChangeSetPredicate::RevisionRange { from, to } => {
                from.map_or(true, |f| change_set.revision >= f) && to.map_or(true, |t| change_set.revision < t)
            }
            ChangeSetPredicate::Committed => change_set.is_committed(),
            ChangeSetPredicate::Contains { event } => change_set.events().any(|e| e.kind() == *event),
            ChangeSetPredicate::TouchesTypes { types } => change_set
                .events()
                .filter_map(|e| e.object_id())
                .any(|id| types.contains(&id.object_type)),
            ChangeSetPredicate::Not { predicate } => !predicate.matches(change_set),
            ChangeSetPredicate::All { predicates } => predicates.iter().all(|p| p.matches(change_set)),
            ChangeSetPredicate::Any { predicates } => predicates.iter().any(|p| p.matches(change_set)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CommitEvent, ItemCreation, ObjectBranchId, TRUNK_BRANCH};
    use crate::rewrite::rewriter::FnRewriter;
    use chrono::Utc;
    use std::cell::Cell;
    use std::rc::Rc;

    fn doc(rev: Revision) -> ChangeSet {
        ChangeSet::new(rev)
            .with_creation(ItemCreation::new(rev, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d1")))
            .with_commit(CommitEvent::new(rev, "tester", Utc::now()))
    }

    #[test]
    fn test_false_predicate_skips_inner() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let inner = FnRewriter(move |mut cs: ChangeSet, sink: &mut dyn EventSink| {
            counter.set(counter.get() + 1);
            cs.revision = 99;
            sink.write(cs)
        });
        let mut filter = FilterRewriter::new(|cs: &ChangeSet| cs.revision > 5, Box::new(inner));

        let input = doc(1);
        let mut out = Vec::new();
        filter.rewrite(input.clone(), &mut out).unwrap();
        assert_eq!(out, vec![input]);
        assert_eq!(calls.get(), 0);

        filter.rewrite(doc(6), &mut out).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(out[1].revision, 99);
    }

    #[test]
    fn test_predicates() {
        let cs = doc(4);
        let range = ChangeSetPredicate::RevisionRange { from: Some(2), to: Some(4) };
        assert!(!range.matches(&cs));
        assert!(ChangeSetPredicate::Committed.matches(&cs));
        assert!(ChangeSetPredicate::Contains { event: EventKind::Creation }.matches(&cs));
        assert!(!ChangeSetPredicate::Contains { event: EventKind::Update }.matches(&cs));

        let touches = ChangeSetPredicate::TouchesTypes {
            types: ["Doc".to_string()].into_iter().collect(),
        };
        let combined = ChangeSetPredicate::All {
            predicates: vec![touches, ChangeSetPredicate::Not { predicate: Box::new(range) }],
        };
        assert!(combined.matches(&cs));
    }

    #[test]
    fn test_predicate_from_json() {
        let p: ChangeSetPredicate = serde_json::from_str(r#"{"when":"revision-range","from":3}"#).unwrap();
        assert_eq!(p, ChangeSetPredicate::RevisionRange { from: Some(3), to: None });
    }
}
