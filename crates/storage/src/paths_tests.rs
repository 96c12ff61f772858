// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn layout_matches_contract() {
    let root = StateRoot::new("/var/state");
    assert_eq!(root.worker_store_path(), Path::new("/var/state/state.json"));
    assert_eq!(root.worker_lock_path(), Path::new("/var/state/state.lock"));
    assert_eq!(
        root.stdout_log_path("w1"),
        Path::new("/var/state/logs/w1.stdout.log")
    );
    assert_eq!(
        root.stderr_log_path("w1"),
        Path::new("/var/state/logs/w1.stderr.log")
    );
    assert_eq!(
        root.ralph_state_path("w1"),
        Path::new("/var/state/ralph/w1/state.json")
    );
    assert_eq!(
        root.iterations_log_path("w1"),
        Path::new("/var/state/ralph/w1/iterations.log")
    );
    assert_eq!(
        root.heartbeat_path("w1"),
        Path::new("/var/state/heartbeats/w1.json")
    );
}

#[test]
fn discover_honors_env_override() {
    // Env access races with other tests in the process; keep the window small.
    let prev = std::env::var(STATE_DIR_ENV).ok();
    std::env::set_var(STATE_DIR_ENV, "/tmp/swarm-test-root");
    let root = StateRoot::discover();
    match prev {
        Some(v) => std::env::set_var(STATE_DIR_ENV, v),
        None => std::env::remove_var(STATE_DIR_ENV),
    }
    assert_eq!(root.path(), Path::new("/tmp/swarm-test-root"));
}
