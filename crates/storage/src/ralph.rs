// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker ralph-loop store: `<state_root>/ralph/<name>/`.

use crate::lock::FileLock;
use crate::paths::StateRoot;
use crate::store::{load_json, save_json, StoreError};
use chrono::{SecondsFormat, Utc};
use std::io::Write;
use swarm_core::{LoopEvent, RalphRecord};

#[derive(Debug, Clone)]
pub struct RalphStore {
    root: StateRoot,
}

impl RalphStore {
    pub fn new(root: StateRoot) -> Self {
        RalphStore { root }
    }

    fn lock(&self, worker: &str) -> Result<FileLock, StoreError> {
        FileLock::acquire(&self.root.ralph_lock_path(worker))
    }

    pub fn save(&self, record: &RalphRecord) -> Result<(), StoreError> {
        let _lock = self.lock(&record.worker_name)?;
        save_json(&self.root.ralph_state_path(&record.worker_name), record)
    }

    pub fn load(&self, worker: &str) -> Result<Option<RalphRecord>, StoreError> {
        let _lock = self.lock(worker)?;
        load_json(&self.root.ralph_state_path(worker))
    }

    /// Apply `mutate` under the lock and persist. Fails with `NotFound`
    /// when no loop state exists for the worker.
    pub fn update(
        &self,
        worker: &str,
        mutate: impl FnOnce(&mut RalphRecord),
    ) -> Result<RalphRecord, StoreError> {
        let _lock = self.lock(worker)?;
        let path = self.root.ralph_state_path(worker);
        let mut record: RalphRecord =
            load_json(&path)?.ok_or_else(|| StoreError::NotFound(worker.to_string()))?;
        mutate(&mut record);
        save_json(&path, &record)?;
        Ok(record)
    }

    /// Append one line to the iteration journal:
    /// `<iso_timestamp> [<EVENT>] <free_text>`.
    pub fn append_iteration_log(
        &self,
        worker: &str,
        event: LoopEvent,
        text: &str,
    ) -> Result<(), StoreError> {
        let path = self.root.iterations_log_path(worker);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        writeln!(file, "{} [{}] {}", stamp, event, text).map_err(|source| StoreError::Io {
            path,
            source,
        })
    }

    /// Delete the worker's entire loop directory. Idempotent.
    pub fn remove(&self, worker: &str) -> Result<(), StoreError> {
        let dir = self.root.ralph_dir(worker);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path: dir, source }),
        }
    }
}

#[cfg(test)]
#[path = "ralph_tests.rs"]
mod tests;
