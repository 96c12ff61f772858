// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat store: `<state_root>/heartbeats/<name>.json`.

use crate::lock::FileLock;
use crate::paths::StateRoot;
use crate::store::{load_json, save_json, StoreError};
use swarm_core::HeartbeatRecord;

#[derive(Debug, Clone)]
pub struct HeartbeatStore {
    root: StateRoot,
}

impl HeartbeatStore {
    pub fn new(root: StateRoot) -> Self {
        HeartbeatStore { root }
    }

    fn lock(&self, worker: &str) -> Result<FileLock, StoreError> {
        FileLock::acquire(&self.root.heartbeat_lock_path(worker))
    }

    pub fn save(&self, record: &HeartbeatRecord) -> Result<(), StoreError> {
        let _lock = self.lock(&record.worker_name)?;
        save_json(&self.root.heartbeat_path(&record.worker_name), record)
    }

    pub fn load(&self, worker: &str) -> Result<Option<HeartbeatRecord>, StoreError> {
        let _lock = self.lock(worker)?;
        load_json(&self.root.heartbeat_path(worker))
    }

    pub fn update(
        &self,
        worker: &str,
        mutate: impl FnOnce(&mut HeartbeatRecord),
    ) -> Result<HeartbeatRecord, StoreError> {
        let _lock = self.lock(worker)?;
        let path = self.root.heartbeat_path(worker);
        let mut record: HeartbeatRecord =
            load_json(&path)?.ok_or_else(|| StoreError::NotFound(worker.to_string()))?;
        mutate(&mut record);
        save_json(&path, &record)?;
        Ok(record)
    }

    /// Remove the record file. Idempotent.
    pub fn remove(&self, worker: &str) -> Result<(), StoreError> {
        let path = self.root.heartbeat_path(worker);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Worker names with a stored heartbeat, in directory order.
    pub fn list_workers(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.root.heartbeats_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(worker) = name.strip_suffix(".json") {
                names.push(worker.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
#[path = "heartbeats_tests.rs"]
mod tests;
