// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{mux_spec, test_engine};
use std::collections::BTreeMap;
use std::path::Path;
use swarm_adapters::WorktreeCall;

#[tokio::test]
async fn respawn_preserves_configuration_with_fresh_start_time() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.env = BTreeMap::from([("K".to_string(), "v".to_string())]);
    spec.tags = ["alpha".to_string()].into();
    let original = engine.spawn(spec).await.unwrap().worker;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let respawned = engine
        .respawn("w", RespawnOptions::default())
        .await
        .unwrap()
        .worker;

    assert_eq!(respawned.command, original.command);
    assert_eq!(respawned.env, original.env);
    assert_eq!(respawned.tags, original.tags);
    assert_eq!(respawned.cwd, original.cwd);
    assert_eq!(
        respawned.mux_info().unwrap().session,
        original.mux_info().unwrap().session
    );
    assert!(respawned.started_at > original.started_at);
    assert!(engine.mux().has_window("sess", "w"));
}

#[tokio::test]
async fn respawn_reuses_the_existing_worktree() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.worktree = Some(crate::spawn::WorktreeSpec {
        base_repo: "/repos/app".into(),
        branch: None,
        path: None,
    });
    let original = engine.spawn(spec).await.unwrap().worker;
    let path = original.worktree.as_ref().unwrap().path.clone();

    let respawned = engine
        .respawn("w", RespawnOptions::default())
        .await
        .unwrap()
        .worker;

    assert_eq!(respawned.worktree, original.worktree);
    assert!(engine.worktrees().exists(&path));
    // No removal happened without clean_first.
    assert!(!engine
        .worktrees()
        .calls()
        .iter()
        .any(|c| matches!(c, WorktreeCall::Remove { .. })));
}

#[tokio::test]
async fn clean_first_recreates_the_worktree_on_the_same_branch() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.worktree = Some(crate::spawn::WorktreeSpec {
        base_repo: "/repos/app".into(),
        branch: Some("feature-x".to_string()),
        path: None,
    });
    engine.spawn(spec).await.unwrap();
    let path = Path::new("/repos/app-worktrees/w");

    let respawned = engine
        .respawn(
            "w",
            RespawnOptions {
                clean_first: true,
                ..RespawnOptions::default()
            },
        )
        .await
        .unwrap()
        .worker;

    assert_eq!(respawned.worktree.as_ref().unwrap().branch, "feature-x");
    assert!(engine.worktrees().exists(path));
    let calls = engine.worktrees().calls();
    let removed_at = calls
        .iter()
        .position(|c| matches!(c, WorktreeCall::Remove { .. }))
        .unwrap();
    let recreated_at = calls
        .iter()
        .rposition(|c| matches!(c, WorktreeCall::Create { .. }))
        .unwrap();
    assert!(removed_at < recreated_at);
}

#[tokio::test]
async fn clean_first_respects_dirty_protection() {
    let (_dir, engine) = test_engine();
    let mut spec = mux_spec("w");
    spec.worktree = Some(crate::spawn::WorktreeSpec {
        base_repo: "/repos/app".into(),
        branch: None,
        path: None,
    });
    engine.spawn(spec).await.unwrap();
    engine
        .worktrees()
        .set_dirty(Path::new("/repos/app-worktrees/w"), 1);

    let err = engine
        .respawn(
            "w",
            RespawnOptions {
                clean_first: true,
                ..RespawnOptions::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Worktree(swarm_adapters::WorktreeError::Dirty { .. })
    ));
}

#[tokio::test]
async fn respawn_unknown_worker_is_not_found() {
    let (_dir, engine) = test_engine();
    let err = engine
        .respawn("ghost", RespawnOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
