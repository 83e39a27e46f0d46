//! End-to-end replay tests
//!
//! A source file store is replayed through a configured pipeline into a
//! destination file store, the way the CLI does it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use history_replay::event::{
    ChangeSet, CommitEvent, ItemCreation, ObjectBranchId, ObjectKey, Revision, CURRENT_REVISION, TRUNK_BRANCH,
};
use history_replay::replay::{ReplayConfig, ReplaySession};
use history_replay::store::{DestinationStore, JsonlStore, SourceStore};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

const SOURCE_SCHEMA: &str = r#"{
    "types": [
        { "name": "Doc", "attributes": [ { "name": "rev", "kind": "revision" } ] },
        { "name": "Ghost" }
    ]
}"#;

const DESTINATION_SCHEMA: &str = r#"{
    "types": [
        { "name": "Doc", "attributes": [ { "name": "rev", "kind": "revision" } ] }
    ]
}"#;

fn commit(rev: Revision) -> CommitEvent {
    CommitEvent::new(rev, "tester", Utc.timestamp_opt(1_700_000_000 + rev, 0).unwrap())
}

fn doc(rev: Revision, referenced: Revision) -> ItemCreation {
    ItemCreation::new(rev, ObjectBranchId::new(TRUNK_BRANCH, "Doc", format!("d{}", rev)))
        .with_value("rev", referenced)
        .with_value("origin", ObjectKey::new(TRUNK_BRANCH, referenced, "Doc", "d1"))
}

/// Revisions 1, 2, 4, 5 (3 was never written). Revision 2 also creates a
/// Ghost the destination does not know.
fn write_source(path: &Path) {
    let mut store = JsonlStore::open(path).unwrap();
    let mut writer = store.replay_writer().unwrap();
    writer
        .write(ChangeSet::new(1).with_creation(doc(1, 1)).with_commit(commit(1)))
        .unwrap();
    writer
        .write(
            ChangeSet::new(2)
                .with_creation(doc(2, 1))
                .with_creation(ItemCreation::new(2, ObjectBranchId::new(TRUNK_BRANCH, "Ghost", "g")))
                .with_commit(commit(2)),
        )
        .unwrap();
    writer
        .write(ChangeSet::new(4).with_creation(doc(4, 2)).with_commit(commit(4)))
        .unwrap();
    writer
        .write(ChangeSet::new(5).with_creation(doc(5, 4)).with_commit(commit(5)))
        .unwrap();
    writer.close().unwrap();
}

struct Fixture {
    _dir: TempDir,
    config: PathBuf,
    destination: PathBuf,
}

fn fixture(unknown_types: &str, adopt_destination: bool) -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_source(&dir.path().join("source.jsonl"));
    fs::write(dir.path().join("source-schema.json"), SOURCE_SCHEMA).unwrap();
    fs::write(dir.path().join("destination-schema.json"), DESTINATION_SCHEMA).unwrap();

    let config = serde_json::json!({
        "source": "source.jsonl",
        "destination": "out/destination.jsonl",
        "source_schema": "source-schema.json",
        "destination_schema": "destination-schema.json",
        "adopt_destination": adopt_destination,
        "unknown_types": unknown_types,
        "rewriters": [ { "kind": "revision-modification", "mode": "auto" } ]
    });
    let config_path = dir.path().join("replay.json");
    fs::write(&config_path, config.to_string()).unwrap();

    Fixture {
        destination: dir.path().join("out/destination.jsonl"),
        config: config_path,
        _dir: dir,
    }
}

fn session(fixture: &Fixture) -> ReplaySession {
    ReplaySession::prepare(ReplayConfig::load(&fixture.config).unwrap()).unwrap()
}

fn read_all(path: &Path) -> Vec<ChangeSet> {
    let store = JsonlStore::open_existing(path).unwrap();
    let mut reader = store.read_change_sets(1, CURRENT_REVISION).unwrap();
    let mut out = Vec::new();
    while let Some(cs) = reader.read().unwrap() {
        out.push(cs);
    }
    reader.close().unwrap();
    out
}

fn referenced(cs: &ChangeSet) -> (i64, i64) {
    let values = &cs.creations[0].values;
    (values["rev"].as_int().unwrap(), values["origin"].as_key().unwrap().history_context)
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_replay_closes_gaps_and_skips_unknown_types() {
    let fixture = fixture("skip", false);
    let stats = session(&fixture).execute(false).unwrap();

    assert_eq!(stats.change_sets_read, 4);
    assert_eq!(stats.change_sets_written, 4);
    assert_eq!(stats.events_skipped, 1);
    assert_eq!(stats.last_revision, 4);

    let written = read_all(&fixture.destination);
    let revisions: Vec<_> = written.iter().map(|cs| cs.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3, 4]);
    assert_eq!(written[1].creations.len(), 1);
    assert_eq!(referenced(&written[2]), (2, 2));
    assert_eq!(referenced(&written[3]), (3, 3));
}

#[test]
fn test_dry_run_leaves_destination_untouched() {
    let fixture = fixture("skip", false);
    let stats = session(&fixture).execute(true).unwrap();

    assert_eq!(stats.change_sets_written, 4);
    assert_eq!(stats.last_revision, 4);
    assert!(!fixture.destination.exists());
}

#[test]
fn test_adopting_destination_continues_its_history() {
    let fixture = fixture("skip", true);
    session(&fixture).execute(false).unwrap();
    let stats = session(&fixture).execute(false).unwrap();
    assert_eq!(stats.last_revision, 8);

    let written = read_all(&fixture.destination);
    let revisions: Vec<_> = written.iter().map(|cs| cs.revision).collect();
    assert_eq!(revisions, (1..=8).collect::<Vec<_>>());
    assert_eq!(referenced(&written[4]), (5, 5));
    assert_eq!(referenced(&written[6]), (6, 6));
    assert_eq!(referenced(&written[7]), (7, 7));
}

#[test]
fn test_unknown_type_fails_and_keeps_last_commit() {
    let fixture = fixture("fail", false);
    let err = session(&fixture).execute(false).unwrap_err();
    assert_eq!(err.code(), "HR_REWRITE_UNKNOWN_TYPE");

    let written = read_all(&fixture.destination);
    let revisions: Vec<_> = written.iter().map(|cs| cs.revision).collect();
    assert_eq!(revisions, vec![1]);
}

#[test]
fn test_missing_source_schema_type_fails_up_front() {
    let fixture = fixture("skip", false);
    let mut config = ReplayConfig::load(&fixture.config).unwrap();
    config.rewriters = serde_json::from_str(r#"[{"kind": "exclude-types", "types": ["Phantom"]}]"#).unwrap();

    let err = ReplaySession::prepare(config).unwrap().build_pipeline(1).err().unwrap();
    assert_eq!(err.code(), "HR_REWRITE_CONFIGURATION");
    assert!(!fixture.destination.exists());
}
