// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker records as persisted in the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Observable worker status. Always re-validated against reality (window
/// existence or PID liveness) before a caller acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Running,
    Stopped,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerStatus::Running => write!(f, "running"),
            WorkerStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Location of a worker inside the terminal multiplexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxInfo {
    pub session: String,
    pub window: String,
    /// Explicit multiplexer server socket; default server when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
}

/// Worktree owned by a worker. When present, the worker's cwd is the
/// worktree path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    pub branch: String,
    pub base_repo: PathBuf,
}

/// Where a worker actually runs: a mux window or a bare OS process.
/// Exactly one of the two exists for any record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerHandle {
    Mux(MuxInfo),
    Process(u32),
}

impl WorkerHandle {
    pub fn mux_info(&self) -> Option<&MuxInfo> {
        match self {
            WorkerHandle::Mux(info) => Some(info),
            WorkerHandle::Process(_) => None,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            WorkerHandle::Mux(_) => None,
            WorkerHandle::Process(pid) => Some(*pid),
        }
    }
}

/// Extra bookkeeping attached to a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMetadata {
    #[serde(default)]
    pub ralph: bool,
    #[serde(default)]
    pub ralph_iteration: u64,
}

/// One registry entry. `name` is the primary key and, by convention, the
/// mux window name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WorkerWire", try_from = "WorkerWire")]
pub struct WorkerRecord {
    pub name: String,
    pub status: WorkerStatus,
    pub command: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
    pub handle: WorkerHandle,
    pub worktree: Option<WorktreeInfo>,
    pub metadata: Option<WorkerMetadata>,
}

impl WorkerRecord {
    pub fn mux_info(&self) -> Option<&MuxInfo> {
        self.handle.mux_info()
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.pid()
    }

    pub fn is_ralph(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.ralph)
    }

    /// (session, socket) pair this worker's window lives in, if any.
    pub fn session_key(&self) -> Option<(String, Option<String>)> {
        self.mux_info()
            .map(|m| (m.session.clone(), m.socket.clone()))
    }
}

/// On-disk shape: the handle sum type flattens to optional `mux_info` and
/// `pid` fields so existing state files keep deserializing.
#[derive(Serialize, Deserialize)]
struct WorkerWire {
    name: String,
    status: WorkerStatus,
    command: Vec<String>,
    started_at: DateTime<Utc>,
    cwd: PathBuf,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    mux_info: Option<MuxInfo>,
    worktree_info: Option<WorktreeInfo>,
    pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<WorkerMetadata>,
}

impl From<WorkerRecord> for WorkerWire {
    fn from(record: WorkerRecord) -> Self {
        let (mux_info, pid) = match record.handle {
            WorkerHandle::Mux(info) => (Some(info), None),
            WorkerHandle::Process(pid) => (None, Some(pid)),
        };
        WorkerWire {
            name: record.name,
            status: record.status,
            command: record.command,
            started_at: record.started_at,
            cwd: record.cwd,
            env: record.env,
            tags: record.tags,
            mux_info,
            worktree_info: record.worktree,
            pid,
            metadata: record.metadata,
        }
    }
}

impl TryFrom<WorkerWire> for WorkerRecord {
    type Error = String;

    fn try_from(wire: WorkerWire) -> Result<Self, Self::Error> {
        let handle = match (wire.mux_info, wire.pid) {
            (Some(info), None) => WorkerHandle::Mux(info),
            (None, Some(pid)) => WorkerHandle::Process(pid),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "worker {} has both mux_info and pid",
                    wire.name
                ))
            }
            (None, None) => {
                return Err(format!(
                    "worker {} has neither mux_info nor pid",
                    wire.name
                ))
            }
        };
        Ok(WorkerRecord {
            name: wire.name,
            status: wire.status,
            command: wire.command,
            started_at: wire.started_at,
            cwd: wire.cwd,
            env: wire.env,
            tags: wire.tags,
            handle,
            worktree: wire.worktree_info,
            metadata: wire.metadata,
        })
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
