// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker registry store: `<state_root>/state.json`.

use crate::lock::FileLock;
use crate::paths::StateRoot;
use crate::store::{load_json, save_json, StoreError};
use serde::{Deserialize, Serialize};
use swarm_core::WorkerRecord;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkersFile {
    #[serde(default)]
    workers: Vec<WorkerRecord>,
}

/// Locked store over the worker registry. Every mutation holds the
/// store's exclusive lock across its whole read-modify-write; `get` and
/// `list_all` return snapshots that callers must not mutate in place.
#[derive(Debug, Clone)]
pub struct WorkerStore {
    root: StateRoot,
}

impl WorkerStore {
    pub fn new(root: StateRoot) -> Self {
        WorkerStore { root }
    }

    pub fn state_root(&self) -> &StateRoot {
        &self.root
    }

    fn load_locked(&self) -> Result<(FileLock, WorkersFile), StoreError> {
        let lock = FileLock::acquire(&self.root.worker_lock_path())?;
        let file = load_json(&self.root.worker_store_path())?.unwrap_or_default();
        Ok((lock, file))
    }

    fn save(&self, file: &WorkersFile) -> Result<(), StoreError> {
        save_json(&self.root.worker_store_path(), file)
    }

    /// Insert a new worker. The duplicate check runs inside the critical
    /// section, so a concurrent spawn of the same name loses here even if
    /// it passed its earlier validation probe.
    pub fn add(&self, worker: WorkerRecord) -> Result<(), StoreError> {
        let (_lock, mut file) = self.load_locked()?;
        if file.workers.iter().any(|w| w.name == worker.name) {
            return Err(StoreError::AlreadyExists(worker.name));
        }
        tracing::debug!(name = %worker.name, "registering worker");
        file.workers.push(worker);
        self.save(&file)
    }

    pub fn remove(&self, name: &str) -> Result<WorkerRecord, StoreError> {
        let (_lock, mut file) = self.load_locked()?;
        let idx = file
            .workers
            .iter()
            .position(|w| w.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let removed = file.workers.remove(idx);
        self.save(&file)?;
        Ok(removed)
    }

    /// Apply `mutate` to the named record under the lock and persist the
    /// result. Returns the updated snapshot.
    pub fn update(
        &self,
        name: &str,
        mutate: impl FnOnce(&mut WorkerRecord),
    ) -> Result<WorkerRecord, StoreError> {
        let (_lock, mut file) = self.load_locked()?;
        let worker = file
            .workers
            .iter_mut()
            .find(|w| w.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        mutate(worker);
        let snapshot = worker.clone();
        self.save(&file)?;
        Ok(snapshot)
    }

    pub fn get(&self, name: &str) -> Result<Option<WorkerRecord>, StoreError> {
        let (_lock, file) = self.load_locked()?;
        Ok(file.workers.into_iter().find(|w| w.name == name))
    }

    pub fn list_all(&self) -> Result<Vec<WorkerRecord>, StoreError> {
        let (_lock, file) = self.load_locked()?;
        Ok(file.workers)
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
