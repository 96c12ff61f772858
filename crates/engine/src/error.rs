// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the lifecycle engine

use swarm_adapters::{MuxError, ProcessError, WorktreeError};
use swarm_storage::StoreError;
use thiserror::Error;

/// Errors that can occur in the engine. The adapter and store layers
/// raise structured errors; this is the policy layer that decides to
/// roll back and surface a diagnostic.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("worker not found: {0}")]
    NotFound(String),
    #[error("worker already exists: {0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
    #[error(transparent)]
    Mux(#[from] MuxError),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("storage error: {0}")]
    Storage(StoreError),
    #[error("ralph loop failed: {0}")]
    Ralph(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(name) => EngineError::AlreadyExists(name),
            StoreError::NotFound(name) => EngineError::NotFound(name),
            other => EngineError::Storage(other),
        }
    }
}

impl From<ProcessError> for EngineError {
    fn from(err: ProcessError) -> Self {
        EngineError::SpawnFailed(err.to_string())
    }
}

impl EngineError {
    /// Exit-code discipline: 0 success, 1 general failure, 2 not found.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::NotFound(_) => 2,
            _ => 1,
        }
    }
}
