// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! swarm-core: record types shared across the swarm workspace

pub mod env;
pub mod heartbeat;
pub mod ralph;
pub mod worker;

pub use env::{parse_env_pair, ValidationError};
pub use heartbeat::{HeartbeatRecord, HeartbeatStatus};
pub use ralph::{
    failure_backoff_secs, ExitReason, LoopEvent, RalphRecord, RalphStatus,
    DEFAULT_INACTIVITY_TIMEOUT_SECS, MAX_CONSECUTIVE_FAILURES,
};
pub use worker::{
    MuxInfo, WorkerHandle, WorkerMetadata, WorkerRecord, WorkerStatus, WorktreeInfo,
};
