// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::prelude::*;

#[test]
fn errors_carry_the_fixed_prefix() {
    let state = tempfile::tempdir().unwrap();
    let out = swarm(state.path(), &["kill", "nope"]);
    assert!(
        stderr(&out).starts_with("swarm: error: "),
        "{}",
        stderr(&out)
    );
}

#[test]
fn invalid_worker_name_fails_validation() {
    let state = tempfile::tempdir().unwrap();
    let out = swarm(
        state.path(),
        &["spawn", "bad name", "--process", "--cwd", "/tmp", "--", "sleep", "1"],
    );
    assert_exit(&out, 1);
    assert!(stderr(&out).contains("swarm: error: "), "{}", stderr(&out));
}

#[test]
fn corrupted_registry_recovers_with_a_fresh_store() {
    let state = tempfile::tempdir().unwrap();
    std::fs::write(state.path().join("state.json"), "{broken").unwrap();

    let out = swarm(
        state.path(),
        &["spawn", "w", "--process", "--cwd", "/tmp", "--", "sleep", "600"],
    );
    assert_exit(&out, 0);
    assert!(state.path().join("state.json.corrupted").exists());
    assert_eq!(worker_names(state.path()), vec!["w"]);

    assert_exit(&swarm(state.path(), &["kill", "w"]), 0);
}

#[test]
fn ralph_status_without_a_loop_exits_two() {
    let state = tempfile::tempdir().unwrap();
    let out = swarm(state.path(), &["ralph", "status", "nobody"]);
    assert_exit(&out, 2);
}

#[test]
fn heartbeat_requires_an_existing_worker() {
    let state = tempfile::tempdir().unwrap();
    let out = swarm(
        state.path(),
        &["heartbeat", "start", "ghost", "--interval", "60"],
    );
    assert_exit(&out, 2);
    assert!(
        stderr(&out).contains("worker not found"),
        "{}",
        stderr(&out)
    );
}
