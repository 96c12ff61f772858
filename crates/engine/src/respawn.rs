// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Respawn: restart a worker with its original configuration.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::kill::KillOptions;
use crate::spawn::{SpawnMode, SpawnSpec, Spawned, WorktreeSpec};
use std::time::Duration;
use swarm_adapters::{MuxAdapter, WorktreeAdapter};
use swarm_core::{WorkerHandle, WorkerStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct RespawnOptions {
    /// Remove and recreate the worktree on the same branch before
    /// restarting.
    pub clean_first: bool,
    pub force_dirty: bool,
    /// Wait for agent readiness after the restart.
    pub ready_timeout: Option<Duration>,
}

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    /// Kill (if still running) and restart, preserving command, env,
    /// tags, cwd, session, and worktree configuration. The old record is
    /// replaced with a fresh one: new `started_at`, new pid/window.
    pub async fn respawn(
        &self,
        name: &str,
        opts: RespawnOptions,
    ) -> Result<Spawned, EngineError> {
        let worker = self
            .workers()
            .get(name)?
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;

        if self.observe_status(&worker).await == WorkerStatus::Running {
            self.kill(name, KillOptions::default()).await?;
        }

        if opts.clean_first {
            if let Some(info) = &worker.worktree {
                self.worktrees()
                    .remove(&info.path, opts.force_dirty)
                    .await?;
                // Recreated by the spawn below, on the same branch.
            }
        }

        let mode = match &worker.handle {
            WorkerHandle::Mux(info) => SpawnMode::Mux {
                session: Some(info.session.clone()),
                socket: info.socket.clone(),
            },
            WorkerHandle::Process(_) => SpawnMode::Process,
        };

        let spec = SpawnSpec {
            name: worker.name.clone(),
            command: worker.command.clone(),
            mode,
            worktree: worker.worktree.as_ref().map(|info| WorktreeSpec {
                base_repo: info.base_repo.clone(),
                branch: Some(info.branch.clone()),
                path: Some(info.path.clone()),
            }),
            env: worker.env.clone(),
            tags: worker.tags.clone(),
            cwd: Some(worker.cwd.clone()),
            ready_timeout: opts.ready_timeout,
            metadata: worker.metadata.clone(),
            remain_on_exit: worker.is_ralph(),
        };

        self.workers().remove(name)?;
        match self.spawn(spec).await {
            Ok(spawned) => Ok(spawned),
            Err(err) => {
                // The old record is gone and the new spawn rolled back;
                // surface the original failure.
                tracing::warn!(name, error = %err, "respawn failed after removing old record");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "respawn_tests.rs"]
mod tests;
