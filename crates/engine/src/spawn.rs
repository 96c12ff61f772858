// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional worker spawn.
//!
//! Spawn proceeds in fixed order: validate, worktree, window/process,
//! registry add, optional readiness wait. If any step after validation
//! fails, the completed steps are reverted in reverse order before the
//! original error is reported. Readiness timeout is the one non-fatal
//! step: the worker is left running with a warning.

use crate::detect::{await_ready, Readiness};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::session::{default_session_name, window_command};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;
use swarm_adapters::worktree::default_worktree_path;
use swarm_adapters::{process, MuxAdapter, WorktreeAdapter};
use swarm_core::{MuxInfo, WorkerHandle, WorkerMetadata, WorkerRecord, WorkerStatus, WorktreeInfo};

/// Where the worker runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnMode {
    /// Detached multiplexer window. Session and socket default to the
    /// shared per-state-root session on the default server.
    Mux {
        session: Option<String>,
        socket: Option<String>,
    },
    /// Bare background process with stdout/stderr log files.
    Process,
}

/// Worktree request: branch and path default per worker name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeSpec {
    pub base_repo: PathBuf,
    pub branch: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub name: String,
    pub command: Vec<String>,
    pub mode: SpawnMode,
    pub worktree: Option<WorktreeSpec>,
    pub env: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
    pub cwd: Option<PathBuf>,
    /// `Some` requests a readiness wait after spawn (mux mode only).
    pub ready_timeout: Option<Duration>,
    pub metadata: Option<WorkerMetadata>,
    /// Keep the pane after process exit so its status stays readable.
    pub remain_on_exit: bool,
}

impl SpawnSpec {
    pub fn new(name: impl Into<String>, command: Vec<String>, mode: SpawnMode) -> Self {
        SpawnSpec {
            name: name.into(),
            command,
            mode,
            worktree: None,
            env: BTreeMap::new(),
            tags: BTreeSet::new(),
            cwd: None,
            ready_timeout: None,
            metadata: None,
            remain_on_exit: false,
        }
    }
}

/// Readiness result attached to a successful spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnReadiness {
    NotRequested,
    Ready { pattern: String },
    /// A first-run setup screen (theme picker, login) is in the way.
    Blocked { pattern: String },
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct Spawned {
    pub worker: WorkerRecord,
    pub readiness: SpawnReadiness,
}

/// Reverse-order cleanup actions accumulated while spawn progresses.
pub(crate) enum Cleanup {
    Worktree {
        path: PathBuf,
    },
    Window {
        session: String,
        window: String,
        socket: Option<String>,
    },
    Process {
        pid: u32,
    },
}

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    pub async fn spawn(&self, spec: SpawnSpec) -> Result<Spawned, EngineError> {
        // Step 1: validation. The name check here is a fast-fail probe;
        // the registry add re-checks under its own lock.
        validate(&spec)?;
        if self.workers().get(&spec.name)?.is_some() {
            return Err(EngineError::AlreadyExists(spec.name));
        }

        let mut cleanup: Vec<Cleanup> = Vec::new();
        match self.spawn_inner(&spec, &mut cleanup).await {
            Ok(spawned) => Ok(spawned),
            Err(err) => {
                self.rollback(cleanup).await;
                Err(err)
            }
        }
    }

    async fn spawn_inner(
        &self,
        spec: &SpawnSpec,
        cleanup: &mut Vec<Cleanup>,
    ) -> Result<Spawned, EngineError> {
        // Step 2: worktree
        let worktree = match &spec.worktree {
            Some(request) => {
                let branch = request
                    .branch
                    .clone()
                    .unwrap_or_else(|| format!("swarm/{}", spec.name));
                let path = request
                    .path
                    .clone()
                    .unwrap_or_else(|| default_worktree_path(&request.base_repo, &spec.name));
                self.worktrees()
                    .create(&path, &branch, &request.base_repo)
                    .await?;
                cleanup.push(Cleanup::Worktree { path: path.clone() });
                Some(WorktreeInfo {
                    path,
                    branch,
                    base_repo: request.base_repo.clone(),
                })
            }
            None => None,
        };

        // A worktree worker always runs inside its worktree.
        let cwd = match (&worktree, &spec.cwd) {
            (Some(info), _) => info.path.clone(),
            (None, Some(cwd)) => cwd.clone(),
            (None, None) => std::env::current_dir().map_err(|e| {
                EngineError::Validation(format!("cannot resolve current directory: {}", e))
            })?,
        };

        // Step 3: window or process
        let handle = match &spec.mode {
            SpawnMode::Mux { session, socket } => {
                let session = session
                    .clone()
                    .unwrap_or_else(|| default_session_name(self.state_root().path()));
                let mux = self.mux().for_socket(socket.as_deref());
                mux.ensure_session(&session).await?;
                let shell_line = window_command(&spec.command, &spec.env);
                mux.create_window(&session, &spec.name, &cwd, &shell_line)
                    .await?;
                cleanup.push(Cleanup::Window {
                    session: session.clone(),
                    window: spec.name.clone(),
                    socket: socket.clone(),
                });
                if spec.remain_on_exit {
                    mux.set_remain_on_exit(&session, &spec.name, true).await?;
                }
                WorkerHandle::Mux(MuxInfo {
                    session,
                    window: spec.name.clone(),
                    socket: socket.clone(),
                })
            }
            SpawnMode::Process => {
                let root = self.state_root();
                let pid = process::spawn_detached(
                    &spec.command,
                    &cwd,
                    &spec.env,
                    &root.stdout_log_path(&spec.name),
                    &root.stderr_log_path(&spec.name),
                )?;
                cleanup.push(Cleanup::Process { pid });
                WorkerHandle::Process(pid)
            }
        };

        // Step 4: registry add (duplicate names rejected under the lock)
        let worker = WorkerRecord {
            name: spec.name.clone(),
            status: WorkerStatus::Running,
            command: spec.command.clone(),
            started_at: Utc::now(),
            cwd,
            env: spec.env.clone(),
            tags: spec.tags.clone(),
            handle,
            worktree,
            metadata: spec.metadata.clone(),
        };
        self.workers().add(worker.clone())?;
        tracing::info!(name = %worker.name, "spawned worker");

        // Step 5: readiness wait. Never rolls back; a timeout leaves the
        // worker running with a warning.
        let readiness = match (&worker.handle, spec.ready_timeout) {
            (WorkerHandle::Mux(info), Some(timeout)) => {
                let mux = self.mux().for_socket(info.socket.as_deref());
                match await_ready(&mux, &info.session, &info.window, timeout).await {
                    Ok(Readiness::Ready { pattern }) => SpawnReadiness::Ready { pattern },
                    Ok(Readiness::Blocked { pattern }) => {
                        tracing::warn!(
                            name = %worker.name,
                            pattern,
                            "worker needs interactive setup before it can accept input"
                        );
                        SpawnReadiness::Blocked { pattern }
                    }
                    Ok(Readiness::TimedOut { .. }) => {
                        tracing::warn!(
                            name = %worker.name,
                            timeout_secs = timeout.as_secs(),
                            "worker not ready before timeout; leaving it running"
                        );
                        SpawnReadiness::TimedOut
                    }
                    Err(e) => {
                        tracing::warn!(name = %worker.name, error = %e, "readiness wait failed");
                        SpawnReadiness::TimedOut
                    }
                }
            }
            _ => SpawnReadiness::NotRequested,
        };

        Ok(Spawned { worker, readiness })
    }

    /// Drain the cleanup stack in reverse order. Failures are warnings;
    /// the original spawn error is what the caller reports.
    pub(crate) async fn rollback(&self, cleanup: Vec<Cleanup>) {
        for action in cleanup.into_iter().rev() {
            match action {
                Cleanup::Window {
                    session,
                    window,
                    socket,
                } => {
                    let mux = self.mux().for_socket(socket.as_deref());
                    if let Err(e) = mux.kill_window(&session, &window).await {
                        tracing::warn!(session, window, error = %e, "rollback: kill window failed");
                    }
                    self.cleanup_session_if_unused(&session, socket.as_deref())
                        .await;
                }
                Cleanup::Process { pid } => {
                    process::terminate(pid, Duration::from_secs(1)).await;
                }
                Cleanup::Worktree { path } => {
                    // Force: this worktree was created moments ago.
                    if let Err(e) = self.worktrees().remove(&path, true).await {
                        tracing::warn!(path = %path.display(), error = %e, "rollback: worktree removal failed");
                    }
                }
            }
        }
    }
}

fn validate(spec: &SpawnSpec) -> Result<(), EngineError> {
    if spec.command.is_empty() {
        return Err(EngineError::Validation(
            "command must not be empty".to_string(),
        ));
    }
    if spec.name.is_empty() {
        return Err(EngineError::Validation(
            "worker name must not be empty".to_string(),
        ));
    }
    // The name doubles as the mux window name and as a path component.
    if spec
        .name
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    {
        return Err(EngineError::Validation(format!(
            "worker name {:?} may only contain letters, digits, '-' and '_'",
            spec.name
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
