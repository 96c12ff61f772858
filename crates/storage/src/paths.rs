// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of the state root.
//!
//! ```text
//! <state_root>/
//! ├── state.json                 # worker store
//! ├── state.lock                 # advisory lock for the worker store
//! ├── logs/<name>.{stdout,stderr}.log
//! ├── ralph/<name>/{state.json,state.lock,iterations.log}
//! └── heartbeats/<name>.json (+ .lock)
//! ```

use std::path::{Path, PathBuf};

pub const STATE_DIR_ENV: &str = "SWARM_STATE_DIR";

/// Root directory holding all persisted swarm state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRoot {
    root: PathBuf,
}

impl StateRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StateRoot { root: root.into() }
    }

    /// Resolve the state root: `$SWARM_STATE_DIR` when set, else
    /// `<home>/.swarm`.
    pub fn discover() -> Self {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            if !dir.is_empty() {
                return StateRoot::new(dir);
            }
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        StateRoot::new(home.join(".swarm"))
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn worker_store_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn worker_lock_path(&self) -> PathBuf {
        self.root.join("state.lock")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn stdout_log_path(&self, worker: &str) -> PathBuf {
        self.logs_dir().join(format!("{}.stdout.log", worker))
    }

    pub fn stderr_log_path(&self, worker: &str) -> PathBuf {
        self.logs_dir().join(format!("{}.stderr.log", worker))
    }

    pub fn ralph_dir(&self, worker: &str) -> PathBuf {
        self.root.join("ralph").join(worker)
    }

    pub fn ralph_state_path(&self, worker: &str) -> PathBuf {
        self.ralph_dir(worker).join("state.json")
    }

    pub fn ralph_lock_path(&self, worker: &str) -> PathBuf {
        self.ralph_dir(worker).join("state.lock")
    }

    pub fn iterations_log_path(&self, worker: &str) -> PathBuf {
        self.ralph_dir(worker).join("iterations.log")
    }

    pub fn heartbeats_dir(&self) -> PathBuf {
        self.root.join("heartbeats")
    }

    pub fn heartbeat_path(&self, worker: &str) -> PathBuf {
        self.heartbeats_dir().join(format!("{}.json", worker))
    }

    pub fn heartbeat_lock_path(&self, worker: &str) -> PathBuf {
        self.heartbeats_dir().join(format!("{}.json.lock", worker))
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
