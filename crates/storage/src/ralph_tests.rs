// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use swarm_core::{ExitReason, RalphStatus};

fn store() -> (tempfile::TempDir, RalphStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RalphStore::new(StateRoot::new(dir.path()));
    (dir, store)
}

#[test]
fn save_then_load_round_trips() {
    let (_dir, store) = store();
    let record = RalphRecord::new("w", "/tmp/p.md".into(), 10);
    store.save(&record).unwrap();
    assert_eq!(store.load("w").unwrap(), Some(record));
}

#[test]
fn load_missing_is_none() {
    let (_dir, store) = store();
    assert_eq!(store.load("ghost").unwrap(), None);
}

#[test]
fn update_persists_mutation() {
    let (_dir, store) = store();
    store
        .save(&RalphRecord::new("w", "/tmp/p.md".into(), 10))
        .unwrap();
    let updated = store
        .update("w", |r| r.finish(ExitReason::MaxIterations))
        .unwrap();
    assert_eq!(updated.status, RalphStatus::Stopped);
    let loaded = store.load("w").unwrap().unwrap();
    assert_eq!(loaded.exit_reason, Some(ExitReason::MaxIterations));
}

#[test]
fn update_missing_is_not_found() {
    let (_dir, store) = store();
    let err = store.update("ghost", |_| {}).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn iteration_log_lines_match_grammar() {
    let (dir, store) = store();
    store
        .append_iteration_log("w", LoopEvent::Start, "iteration 1/10")
        .unwrap();
    store
        .append_iteration_log("w", LoopEvent::Fail, "exit code 2")
        .unwrap();

    let content = std::fs::read_to_string(dir.path().join("ralph/w/iterations.log")).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" [START] iteration 1/10"), "{}", lines[0]);
    assert!(lines[1].contains(" [FAIL] exit code 2"), "{}", lines[1]);
    // ISO-8601 timestamp up front.
    let stamp = lines[0].split(' ').next().unwrap();
    assert!(
        chrono::DateTime::parse_from_rfc3339(stamp).is_ok(),
        "bad timestamp {}",
        stamp
    );
}

#[test]
fn remove_deletes_directory_and_is_idempotent() {
    let (dir, store) = store();
    store
        .save(&RalphRecord::new("w", "/tmp/p.md".into(), 10))
        .unwrap();
    store
        .append_iteration_log("w", LoopEvent::Start, "x")
        .unwrap();
    assert!(dir.path().join("ralph/w").exists());

    store.remove("w").unwrap();
    assert!(!dir.path().join("ralph/w").exists());
    store.remove("w").unwrap();
}

#[test]
fn corrupted_state_recovers_fresh() {
    let (dir, store) = store();
    std::fs::create_dir_all(dir.path().join("ralph/w")).unwrap();
    std::fs::write(dir.path().join("ralph/w/state.json"), "nope").unwrap();
    assert_eq!(store.load("w").unwrap(), None);
    assert!(dir.path().join("ralph/w/state.json.corrupted").exists());
}
