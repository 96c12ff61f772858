// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn spawn_probe_terminate_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let pid = spawn_detached(
        &command(&["sleep", "60"]),
        dir.path(),
        &BTreeMap::new(),
        &dir.path().join("logs/w.stdout.log"),
        &dir.path().join("logs/w.stderr.log"),
    )
    .unwrap();

    assert!(is_alive(pid));
    terminate(pid, Duration::from_secs(5)).await;
    // sleep dies on SIGTERM within the grace period.
    assert!(!is_alive(pid));
}

#[tokio::test]
async fn spawn_writes_output_to_log_files() {
    let dir = tempfile::tempdir().unwrap();
    let stdout_log = dir.path().join("logs/w.stdout.log");
    let pid = spawn_detached(
        &command(&["sh", "-c", "echo from-worker"]),
        dir.path(),
        &BTreeMap::new(),
        &stdout_log,
        &dir.path().join("logs/w.stderr.log"),
    )
    .unwrap();

    // Give the child a moment to run and flush.
    for _ in 0..50 {
        if !is_alive(pid) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let content = std::fs::read_to_string(&stdout_log).unwrap();
    assert!(content.contains("from-worker"), "log: {}", content);
}

#[tokio::test]
async fn spawn_applies_env_and_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let stdout_log = dir.path().join("logs/w.stdout.log");
    let env = BTreeMap::from([("SWARM_TEST_VALUE".to_string(), "marker-42".to_string())]);
    let pid = spawn_detached(
        &command(&["sh", "-c", "echo $SWARM_TEST_VALUE; pwd"]),
        dir.path(),
        &env,
        &stdout_log,
        &dir.path().join("logs/w.stderr.log"),
    )
    .unwrap();

    for _ in 0..50 {
        if !is_alive(pid) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let content = std::fs::read_to_string(&stdout_log).unwrap();
    assert!(content.contains("marker-42"), "log: {}", content);
}

#[test]
fn empty_command_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = spawn_detached(
        &[],
        dir.path(),
        &BTreeMap::new(),
        &dir.path().join("o.log"),
        &dir.path().join("e.log"),
    )
    .unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
}

#[test]
fn missing_binary_is_a_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = spawn_detached(
        &command(&["swarm-no-such-binary-xyz"]),
        dir.path(),
        &BTreeMap::new(),
        &dir.path().join("o.log"),
        &dir.path().join("e.log"),
    )
    .unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
}

#[tokio::test]
async fn terminate_missing_pid_is_silent() {
    // PID 2^22-ish beyond typical pid_max ranges; if it happens to exist
    // the SIGTERM still only targets a test-owned namespace in CI.
    terminate(4_000_000, Duration::from_millis(100)).await;
}

#[test]
fn is_alive_false_for_missing_pid() {
    assert!(!is_alive(4_000_000));
}
