// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker termination and registry removal.

use crate::engine::Engine;
use crate::error::EngineError;
use swarm_adapters::{process, MuxAdapter, WorktreeAdapter, WorktreeError};
use swarm_core::{ExitReason, HeartbeatStatus, WorkerHandle, WorkerRecord, WorkerStatus};
use swarm_storage::StoreError;

#[derive(Debug, Clone, Copy, Default)]
pub struct KillOptions {
    /// Also remove the worker's worktree (dirty trees are protected
    /// unless `force_dirty`).
    pub remove_worktree: bool,
    pub force_dirty: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    pub remove_worktree: bool,
    pub force_dirty: bool,
}

/// What a kill actually did. Dirty-worktree protection downgrades the
/// removal to a warning rather than failing the kill.
#[derive(Debug, Clone, Default)]
pub struct KillOutcome {
    pub worktree_removed: bool,
    pub warnings: Vec<String>,
}

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    /// Graceful-then-forceful termination. Transitions `status` to
    /// `stopped` but keeps the registry record; repeated kills succeed.
    pub async fn kill(&self, name: &str, opts: KillOptions) -> Result<KillOutcome, EngineError> {
        let worker = self
            .workers()
            .get(name)?
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;

        let mut outcome = KillOutcome::default();

        match &worker.handle {
            WorkerHandle::Mux(info) => {
                let mux = self.mux().for_socket(info.socket.as_deref());
                mux.kill_window(&info.session, &info.window).await?;
            }
            WorkerHandle::Process(pid) => {
                process::terminate(*pid, process::KILL_GRACE_PERIOD).await;
            }
        }

        self.workers()
            .update(name, |w| w.status = WorkerStatus::Stopped)?;

        // Cross-store invariant, enforced here: a dead worker's heartbeat
        // stops with it.
        match self
            .heartbeats()
            .update(name, |hb| hb.status = HeartbeatStatus::Stopped)
        {
            Ok(_) | Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        // A killed ralph worker must not be respawned by its monitor.
        if worker.is_ralph() {
            match self.ralphs().update(name, |r| {
                if !r.status.is_terminal() {
                    r.finish(ExitReason::Killed);
                }
            }) {
                Ok(_) | Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if opts.remove_worktree {
            self.remove_worker_worktree(&worker, opts.force_dirty, &mut outcome)
                .await?;
        }

        if let Some((session, socket)) = worker.session_key() {
            self.cleanup_session_if_unused(&session, socket.as_deref())
                .await;
        }

        tracing::info!(name, "killed worker");
        Ok(outcome)
    }

    /// Remove a worker from the registry entirely, killing it first if it
    /// is still running.
    pub async fn clean(&self, name: &str, opts: CleanOptions) -> Result<KillOutcome, EngineError> {
        let worker = self
            .workers()
            .get(name)?
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;

        let mut outcome = KillOutcome::default();
        if self.observe_status(&worker).await == WorkerStatus::Running {
            outcome = self
                .kill(
                    name,
                    KillOptions {
                        remove_worktree: false,
                        force_dirty: false,
                    },
                )
                .await?;
        }

        if opts.remove_worktree {
            self.remove_worker_worktree(&worker, opts.force_dirty, &mut outcome)
                .await?;
        }

        self.workers().remove(name)?;
        self.heartbeats().remove(name)?;
        if worker.is_ralph() {
            self.ralphs().remove(name)?;
        }

        if let Some((session, socket)) = worker.session_key() {
            self.cleanup_session_if_unused(&session, socket.as_deref())
                .await;
        }

        tracing::info!(name, "cleaned worker");
        Ok(outcome)
    }

    async fn remove_worker_worktree(
        &self,
        worker: &WorkerRecord,
        force_dirty: bool,
        outcome: &mut KillOutcome,
    ) -> Result<(), EngineError> {
        let Some(info) = &worker.worktree else {
            return Ok(());
        };
        match self.worktrees().remove(&info.path, force_dirty).await {
            Ok(()) => {
                outcome.worktree_removed = true;
                // The loop state of a ralph worker goes with its worktree.
                if worker.is_ralph() {
                    self.ralphs().remove(&worker.name)?;
                }
            }
            Err(WorktreeError::Dirty { path, changes }) => {
                let warning = format!(
                    "worktree {} kept: {} uncommitted change(s); re-run with --force-dirty to discard",
                    path.display(),
                    changes
                );
                tracing::warn!(name = %worker.name, "{}", warning);
                outcome.warnings.push(warning);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Kill the session iff no registry worker still references the same
    /// `(session, socket)` pair.
    pub(crate) async fn cleanup_session_if_unused(&self, session: &str, socket: Option<&str>) {
        let still_used = match self.workers().list_all() {
            Ok(workers) => workers.iter().any(|w| {
                w.mux_info()
                    .map(|info| info.session == session && info.socket.as_deref() == socket)
                    .unwrap_or(false)
            }),
            Err(e) => {
                tracing::warn!(error = %e, "session cleanup: cannot list workers");
                true
            }
        };
        if still_used {
            return;
        }
        let mux = self.mux().for_socket(socket);
        match mux.session_exists(session).await {
            Ok(true) => {
                if let Err(e) = mux.kill_session(session).await {
                    tracing::warn!(session, error = %e, "session cleanup failed");
                } else {
                    tracing::debug!(session, "killed now-empty session");
                }
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(session, error = %e, "session cleanup probe failed"),
        }
    }
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
