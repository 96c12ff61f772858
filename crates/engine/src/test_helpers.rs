// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use crate::engine::Engine;
use crate::spawn::{SpawnMode, SpawnSpec};
use swarm_adapters::{FakeMux, FakeWorktree};
use swarm_storage::StateRoot;

pub fn test_engine() -> (tempfile::TempDir, Engine<FakeMux, FakeWorktree>) {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(
        StateRoot::new(dir.path()),
        FakeMux::new(),
        FakeWorktree::new(),
    );
    (dir, engine)
}

/// Mux-mode spec with a fixed session name so tests can address windows.
pub fn mux_spec(name: &str) -> SpawnSpec {
    let mut spec = SpawnSpec::new(
        name,
        vec!["claude".to_string(), "--continue".to_string()],
        SpawnMode::Mux {
            session: Some("sess".to_string()),
            socket: None,
        },
    );
    spec.cwd = Some("/tmp".into());
    spec
}

pub fn process_spec(name: &str, command: &[&str]) -> SpawnSpec {
    let mut spec = SpawnSpec::new(
        name,
        command.iter().map(|s| s.to_string()).collect(),
        SpawnMode::Process,
    );
    spec.cwd = Some("/tmp".into());
    spec
}
