// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

/// Run `swarm` with the given args against an isolated state root.
pub fn swarm(state_root: &Path, args: &[&str]) -> Output {
    assert_cmd::Command::cargo_bin("swarm")
        .unwrap()
        .env("SWARM_STATE_DIR", state_root)
        .args(args)
        .output()
        .unwrap()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {}\nstdout: {}\nstderr: {}",
        code,
        stdout(output),
        stderr(output)
    );
}

/// The registry file parsed as JSON (empty store when absent).
pub fn registry(state_root: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(state_root.join("state.json"))
        .unwrap_or_else(|_| "{\"workers\":[]}".to_string());
    serde_json::from_str(&raw).unwrap()
}

pub fn worker_names(state_root: &Path) -> Vec<String> {
    registry(state_root)["workers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap().to_string())
        .collect()
}
