// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{mux_spec, process_spec, test_engine};
use swarm_adapters::process;

#[tokio::test]
async fn mux_worker_tracks_window_existence() {
    let (_dir, engine) = test_engine();
    let spawned = engine.spawn(mux_spec("w")).await.unwrap();
    assert_eq!(
        engine.observe_status(&spawned.worker).await,
        WorkerStatus::Running
    );

    engine.mux().remove_window("sess", "w");
    assert_eq!(
        engine.observe_status(&spawned.worker).await,
        WorkerStatus::Stopped
    );
}

#[tokio::test]
async fn observation_does_not_write_the_registry() {
    let (_dir, engine) = test_engine();
    let spawned = engine.spawn(mux_spec("w")).await.unwrap();
    engine.mux().remove_window("sess", "w");

    let refreshed = engine.get_refreshed("w").await.unwrap().unwrap();
    assert_eq!(refreshed.status, WorkerStatus::Stopped);
    // The stored record still says running; only mutating commands write.
    assert_eq!(
        engine.workers().get("w").unwrap().unwrap().status,
        WorkerStatus::Running
    );
    drop(spawned);
}

#[tokio::test]
async fn process_worker_tracks_pid_liveness() {
    let (_dir, engine) = test_engine();
    let spawned = engine
        .spawn(process_spec("p", &["sleep", "60"]))
        .await
        .unwrap();
    assert_eq!(
        engine.observe_status(&spawned.worker).await,
        WorkerStatus::Running
    );

    let pid = spawned.worker.pid().unwrap();
    process::terminate(pid, std::time::Duration::from_secs(5)).await;
    assert_eq!(
        engine.observe_status(&spawned.worker).await,
        WorkerStatus::Stopped
    );
}

#[tokio::test]
async fn get_refreshed_returns_none_for_unknown() {
    let (_dir, engine) = test_engine();
    assert!(engine.get_refreshed("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn list_refreshed_observes_every_worker() {
    let (_dir, engine) = test_engine();
    engine.spawn(mux_spec("a")).await.unwrap();
    engine.spawn(mux_spec("b")).await.unwrap();
    engine.mux().remove_window("sess", "a");

    let workers = engine.list_refreshed().await.unwrap();
    let by_name: std::collections::HashMap<_, _> = workers
        .into_iter()
        .map(|w| (w.name.clone(), w.status))
        .collect();
    assert_eq!(by_name["a"], WorkerStatus::Stopped);
    assert_eq!(by_name["b"], WorkerStatus::Running);
}
