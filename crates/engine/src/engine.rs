// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lifecycle engine: owns the stores and the external-tool adapters.

use swarm_adapters::{MuxAdapter, WorktreeAdapter};
use swarm_core::WorkerRecord;
use swarm_storage::{HeartbeatStore, RalphStore, StateRoot, WorkerStore};

/// Policy layer over the registry and the adapters. One engine is built
/// per CLI invocation; all cross-invocation state lives in the stores.
#[derive(Clone)]
pub struct Engine<M: MuxAdapter, W: WorktreeAdapter> {
    root: StateRoot,
    workers: WorkerStore,
    ralphs: RalphStore,
    heartbeats: HeartbeatStore,
    mux: M,
    worktrees: W,
}

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    pub fn new(root: StateRoot, mux: M, worktrees: W) -> Self {
        Engine {
            workers: WorkerStore::new(root.clone()),
            ralphs: RalphStore::new(root.clone()),
            heartbeats: HeartbeatStore::new(root.clone()),
            root,
            mux,
            worktrees,
        }
    }

    pub fn state_root(&self) -> &StateRoot {
        &self.root
    }

    pub fn workers(&self) -> &WorkerStore {
        &self.workers
    }

    pub fn ralphs(&self) -> &RalphStore {
        &self.ralphs
    }

    pub fn heartbeats(&self) -> &HeartbeatStore {
        &self.heartbeats
    }

    pub fn worktrees(&self) -> &W {
        &self.worktrees
    }

    /// Default mux adapter (default server socket).
    pub fn mux(&self) -> &M {
        &self.mux
    }

    /// Adapter bound to the worker's own socket, when one was recorded.
    pub fn mux_for(&self, worker: &WorkerRecord) -> M {
        let socket = worker.mux_info().and_then(|info| info.socket.as_deref());
        self.mux.for_socket(socket)
    }
}
