// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{mux_spec, process_spec, test_engine};
use std::collections::BTreeMap;
use std::path::Path;
use swarm_adapters::{process, MuxCall, WorktreeCall};
use swarm_core::WorkerStatus;

#[tokio::test]
async fn mux_spawn_registers_worker_and_creates_window() {
    let (_dir, engine) = test_engine();
    let spawned = engine.spawn(mux_spec("builder")).await.unwrap();

    assert_eq!(spawned.worker.name, "builder");
    assert_eq!(spawned.worker.status, WorkerStatus::Running);
    assert_eq!(spawned.readiness, SpawnReadiness::NotRequested);
    let info = spawned.worker.mux_info().unwrap();
    assert_eq!(info.session, "sess");
    assert_eq!(info.window, "builder");

    assert!(engine.mux().has_session("sess"));
    assert!(engine.mux().has_window("sess", "builder"));
    assert_eq!(
        engine.mux().window_command("sess", "builder").unwrap(),
        "claude --continue"
    );

    let stored = engine.workers().get("builder").unwrap().unwrap();
    assert_eq!(stored.command, vec!["claude", "--continue"]);
}

#[tokio::test]
async fn env_is_applied_via_leading_shim() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.env = BTreeMap::from([("API_KEY".to_string(), "secret value".to_string())]);
    engine.spawn(spec).await.unwrap();

    assert_eq!(
        engine.mux().window_command("sess", "w").unwrap(),
        "env 'API_KEY=secret value' claude --continue"
    );
}

#[tokio::test]
async fn worktree_spawn_pins_cwd_to_the_worktree() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("builder");
    spec.worktree = Some(WorktreeSpec {
        base_repo: "/repos/app".into(),
        branch: None,
        path: None,
    });
    let spawned = engine.spawn(spec).await.unwrap();

    let info = spawned.worker.worktree.as_ref().unwrap();
    assert_eq!(info.branch, "swarm/builder");
    assert_eq!(info.path, Path::new("/repos/app-worktrees/builder"));
    assert_eq!(info.base_repo, Path::new("/repos/app"));
    // Invariant: worktree workers run inside their worktree.
    assert_eq!(spawned.worker.cwd, info.path);
    assert!(engine.worktrees().exists(&info.path));
}

#[tokio::test]
async fn empty_command_is_rejected_before_any_side_effect() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.command.clear();
    let err = engine.spawn(spec).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.mux().calls().is_empty());
}

#[tokio::test]
async fn bad_worker_name_is_rejected() {
    let (_dir, engine) = test_engine();
    let err = engine.spawn(mux_spec("has space")).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn duplicate_name_is_rejected_without_new_window() {
    let (_dir, engine) = test_engine();
    engine.spawn(mux_spec("w")).await.unwrap();
    let windows_before = engine.mux().calls().len();

    let err = engine.spawn(mux_spec("w")).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists(_)));
    assert_eq!(engine.mux().calls().len(), windows_before);
    assert_eq!(engine.workers().list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn not_a_repository_fails_before_window_creation() {
    let (_dir, engine) = test_engine();
    engine.worktrees().set_not_a_repository(Path::new("/plain"));
    let mut spec = mux_spec("w");
    spec.worktree = Some(WorktreeSpec {
        base_repo: "/plain".into(),
        branch: None,
        path: None,
    });

    let err = engine.spawn(spec).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Worktree(swarm_adapters::WorktreeError::NotARepository(_))
    ));
    assert!(!engine
        .mux()
        .calls()
        .iter()
        .any(|c| matches!(c, MuxCall::CreateWindow { .. })));
}

#[tokio::test]
async fn failed_window_creation_rolls_back_worktree_and_registry() {
    let (_dir, engine) = test_engine();
    engine.mux().fail_next_create_window("tmux exploded");
    let mut spec = mux_spec("w");
    spec.worktree = Some(WorktreeSpec {
        base_repo: "/repos/app".into(),
        branch: None,
        path: None,
    });

    let err = engine.spawn(spec).await.unwrap_err();
    assert!(matches!(err, EngineError::Mux(_)));

    // No residual record, no residual worktree.
    assert!(engine.workers().get("w").unwrap().is_none());
    assert!(!engine.worktrees().exists(Path::new("/repos/app-worktrees/w")));
    // The worktree rollback was forced: it was created moments ago.
    assert!(engine
        .worktrees()
        .calls()
        .iter()
        .any(|c| matches!(c, WorktreeCall::Remove { force: true, .. })));
}

#[tokio::test]
async fn process_spawn_produces_live_pid_and_log_paths() {
    let (dir, engine) = test_engine();
    let spawned = engine
        .spawn(process_spec("sleeper", &["sleep", "60"]))
        .await
        .unwrap();

    let pid = spawned.worker.pid().unwrap();
    assert!(process::is_alive(pid));
    assert!(spawned.worker.mux_info().is_none());
    assert!(dir.path().join("logs/sleeper.stdout.log").exists());
    assert!(dir.path().join("logs/sleeper.stderr.log").exists());

    process::terminate(pid, std::time::Duration::from_secs(5)).await;
}

#[tokio::test]
async fn process_spawn_with_missing_binary_rolls_back() {
    let (_dir, engine) = test_engine();
    let err = engine
        .spawn(process_spec("ghost", &["swarm-no-such-binary-xyz"]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SpawnFailed(_)));
    assert!(engine.workers().get("ghost").unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn readiness_wait_reports_ready_pattern() {
    let (_dir, engine) = test_engine();
    engine.mux().script_window(vec!["booting...", "> "], None);
    let mut spec = mux_spec("w");
    spec.ready_timeout = Some(std::time::Duration::from_secs(30));

    let spawned = engine.spawn(spec).await.unwrap();
    assert!(matches!(spawned.readiness, SpawnReadiness::Ready { .. }));
}

#[tokio::test(start_paused = true)]
async fn readiness_timeout_warns_but_keeps_worker() {
    let (_dir, engine) = test_engine();
    engine.mux().script_window(vec!["never ready"], None);
    let mut spec = mux_spec("w");
    spec.ready_timeout = Some(std::time::Duration::from_secs(2));

    let spawned = engine.spawn(spec).await.unwrap();
    assert_eq!(spawned.readiness, SpawnReadiness::TimedOut);
    assert!(engine.workers().get("w").unwrap().is_some());
    assert!(engine.mux().has_window("sess", "w"));
}

#[tokio::test(start_paused = true)]
async fn readiness_reports_blocking_setup_screens() {
    let (_dir, engine) = test_engine();
    engine
        .mux()
        .script_window(vec!["Select login method:"], None);
    let mut spec = mux_spec("w");
    spec.ready_timeout = Some(std::time::Duration::from_secs(30));

    let spawned = engine.spawn(spec).await.unwrap();
    assert!(matches!(spawned.readiness, SpawnReadiness::Blocked { .. }));
}

#[tokio::test]
async fn remain_on_exit_is_set_when_requested() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.remain_on_exit = true;
    engine.spawn(spec).await.unwrap();
    assert!(engine
        .mux()
        .calls()
        .iter()
        .any(|c| matches!(c, MuxCall::SetRemainOnExit { on: true, .. })));
}
