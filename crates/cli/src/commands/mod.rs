// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand implementations. Argument parsing and presentation only;
//! behavior lives in swarm-engine.

pub mod attach;
pub mod clean;
pub mod heartbeat;
pub mod kill;
pub mod logs;
pub mod ls;
pub mod ralph;
pub mod respawn;
pub mod send;
pub mod spawn;
pub mod status;
pub mod wait;

use swarm_adapters::{GitWorktree, TmuxMux};

pub type SwarmEngine = swarm_engine::Engine<TmuxMux, GitWorktree>;
