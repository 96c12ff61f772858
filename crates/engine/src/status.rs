// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral status refresh against external reality.

use crate::engine::Engine;
use crate::error::EngineError;
use swarm_adapters::{process, MuxAdapter, WorktreeAdapter};
use swarm_core::{WorkerHandle, WorkerRecord, WorkerStatus};

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    /// What is actually true right now: window exists / PID alive.
    /// Observing is a read; the registry is only updated by mutating
    /// commands (kill, clean, wait).
    pub async fn observe_status(&self, worker: &WorkerRecord) -> WorkerStatus {
        match &worker.handle {
            WorkerHandle::Mux(info) => {
                let mux = self.mux().for_socket(info.socket.as_deref());
                match mux.window_exists(&info.session, &info.window).await {
                    Ok(true) => WorkerStatus::Running,
                    Ok(false) => WorkerStatus::Stopped,
                    Err(e) => {
                        tracing::warn!(name = %worker.name, error = %e, "status probe failed");
                        WorkerStatus::Stopped
                    }
                }
            }
            WorkerHandle::Process(pid) => {
                if process::is_alive(*pid) {
                    WorkerStatus::Running
                } else {
                    WorkerStatus::Stopped
                }
            }
        }
    }

    /// Fetch a worker and observe its live status in one step.
    pub async fn get_refreshed(&self, name: &str) -> Result<Option<WorkerRecord>, EngineError> {
        let Some(mut worker) = self.workers().get(name)? else {
            return Ok(None);
        };
        worker.status = self.observe_status(&worker).await;
        Ok(Some(worker))
    }

    /// All workers with observed status.
    pub async fn list_refreshed(&self) -> Result<Vec<WorkerRecord>, EngineError> {
        let mut workers = self.workers().list_all()?;
        for worker in &mut workers {
            worker.status = self.observe_status(worker).await;
        }
        Ok(workers)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
