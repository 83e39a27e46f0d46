//! Revision renumbering tests
//!
//! The output of the revision engine is one gapless timeline, and every
//! revision referenced from payload data follows the change-set it points at.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{TimeZone, Utc};
use history_replay::event::{
    ChangeSet, CommitEvent, ItemCreation, ObjectBranchId, ObjectKey, Revision, Value, CURRENT_REVISION, TRUNK_BRANCH,
};
use history_replay::revision::{Mode, RevisionAttributes, RevisionModificator};
use history_replay::rewrite::{build_chain, BuildContext, EventRewriter, RewriterSpec};
use proptest::prelude::*;

// =============================================================================
// Test Utilities
// =============================================================================

fn engine(start: Revision) -> RevisionModificator {
    let attrs = BTreeMap::from([("Doc".to_string(), BTreeSet::from(["rev".to_string()]))]);
    RevisionModificator::new(RevisionAttributes::from_config(attrs), start)
}

fn commit(rev: Revision) -> CommitEvent {
    CommitEvent::new(rev, "tester", Utc.timestamp_opt(1_700_000_000 + rev, 0).unwrap())
}

/// A change-set creating one Doc that records `referenced` in its `rev`
/// attribute and in a key to the `origin` Doc.
fn doc_change_set(rev: Revision, referenced: Revision) -> ChangeSet {
    let creation = ItemCreation::new(rev, ObjectBranchId::new(TRUNK_BRANCH, "Doc", format!("d{}", rev)))
        .with_value("rev", referenced)
        .with_value("origin", ObjectKey::new(TRUNK_BRANCH, referenced, "Doc", "origin"));
    ChangeSet::new(rev).with_creation(creation).with_commit(commit(rev))
}

fn run_all(rewriter: &mut dyn EventRewriter, input: Vec<ChangeSet>) -> Vec<ChangeSet> {
    let mut out = Vec::new();
    for cs in input {
        rewriter.rewrite(cs, &mut out).unwrap();
    }
    out
}

fn referenced(cs: &ChangeSet) -> (i64, i64) {
    let values = &cs.creations[0].values;
    let rev = values["rev"].as_int().unwrap();
    let key = values["origin"].as_key().unwrap().history_context;
    (rev, key)
}

/// Strictly increasing revisions starting at 1, with gaps of up to two.
fn gapped_revisions() -> impl Strategy<Value = Vec<Revision>> {
    prop::collection::vec(1i64..=3, 1..24).prop_map(|steps| {
        let mut rev = 0;
        let mut revisions = Vec::with_capacity(steps.len());
        for (i, step) in steps.into_iter().enumerate() {
            rev += if i == 0 { 1 } else { step };
            revisions.push(rev);
        }
        revisions
    })
}

// =============================================================================
// Fixed Scenarios
// =============================================================================

#[test]
fn test_auto_mode_closes_gap_and_follows_references() {
    let mut engine = engine(1);
    engine.set_mode(Mode::Auto);

    let input = vec![
        doc_change_set(1, 1),
        doc_change_set(2, 1),
        doc_change_set(4, 2),
        doc_change_set(5, 4),
    ];
    let out = run_all(&mut engine, input);

    let revisions: Vec<_> = out.iter().map(|cs| cs.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3, 4]);
    assert_eq!(referenced(&out[2]), (2, 2));
    assert_eq!(referenced(&out[3]), (3, 3));
    assert_eq!(out[3].commit.as_ref().unwrap().revision, 4);
    assert_eq!(engine.current_modification(), -1);
}

#[test]
fn test_synthetic_revisions_shift_following_history() {
    let mut engine = engine(1);
    let mut out = run_all(&mut engine, vec![doc_change_set(1, 1), doc_change_set(2, 1)]);

    engine.set_mode(Mode::FakingHistory);
    out.extend(run_all(&mut engine, vec![doc_change_set(3, 3), doc_change_set(4, 3)]));
    engine.set_mode(Mode::Replay);
    assert_eq!(engine.current_modification(), 2);

    // Original revisions 3 and 4 follow the two synthetic ones.
    out.extend(run_all(&mut engine, vec![doc_change_set(3, 2), doc_change_set(4, 3)]));

    let revisions: Vec<_> = out.iter().map(|cs| cs.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(referenced(&out[4]), (2, 2));
    assert_eq!(referenced(&out[5]), (5, 5));
}

#[test]
fn test_declared_engine_continues_destination() {
    let specs: Vec<RewriterSpec> = serde_json::from_str(
        r#"[{"kind": "revision-modification", "revision_attributes": {"Doc": ["rev"]}}]"#,
    )
    .unwrap();
    let ctx = BuildContext::new(None).with_revisions(1, 11);
    let mut chain = build_chain(&specs, &ctx).unwrap();

    let out = run_all(chain.as_mut(), vec![doc_change_set(1, 1), doc_change_set(2, 1)]);
    let revisions: Vec<_> = out.iter().map(|cs| cs.revision).collect();
    assert_eq!(revisions, vec![11, 12]);
    assert_eq!(referenced(&out[1]), (11, 11));
}

#[test]
fn test_current_revision_references_pass_through() {
    let mut engine = engine(1);
    engine.set_mode(Mode::Auto);
    let cs = ChangeSet::new(3)
        .with_creation(
            ItemCreation::new(3, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d"))
                .with_value("latest", ObjectKey::new(TRUNK_BRANCH, CURRENT_REVISION, "Doc", "other"))
                .with_value("rev", Value::NextCommitNumber),
        )
        .with_commit(commit(3));

    let out = run_all(&mut engine, vec![cs]);
    let values = &out[0].creations[0].values;
    assert!(values["latest"].as_key().unwrap().is_current());
    assert_eq!(values["rev"], Value::NextCommitNumber);
    assert_eq!(out[0].revision, 1);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    /// Replaying unmodified history changes nothing.
    #[test]
    fn replay_of_contiguous_history_is_identity(picks in prop::collection::vec(any::<prop::sample::Index>(), 1..24)) {
        let input: Vec<_> = picks
            .iter()
            .enumerate()
            .map(|(i, pick)| {
                let rev = i as Revision + 1;
                doc_change_set(rev, pick.index(i + 1) as Revision + 1)
            })
            .collect();

        let mut engine = engine(1);
        let out = run_all(&mut engine, input.clone());
        prop_assert_eq!(out, input);
    }

    /// Dropped revisions close up, and references land on the renumbered
    /// change-set they pointed at.
    #[test]
    fn auto_mode_renumbers_gapped_history(revisions in gapped_revisions(), seed in any::<prop::sample::Index>()) {
        let input: Vec<_> = revisions
            .iter()
            .enumerate()
            .map(|(i, &rev)| doc_change_set(rev, revisions[seed.index(i + 1)]))
            .collect();

        let mut engine = engine(1);
        engine.set_mode(Mode::Auto);
        let out = run_all(&mut engine, input);

        for (i, cs) in out.iter().enumerate() {
            let expected = i as Revision + 1;
            prop_assert_eq!(cs.revision, expected);
            prop_assert_eq!(cs.creations[0].revision, expected);
            prop_assert_eq!(cs.commit.as_ref().unwrap().revision, expected);

            let target = revisions[seed.index(i + 1)];
            let position = revisions.iter().position(|&r| r == target).unwrap() as Revision + 1;
            prop_assert_eq!(referenced(cs), (position, position));
        }
    }
}
