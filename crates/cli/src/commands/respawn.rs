// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm respawn`

use super::SwarmEngine;
use clap::Args;
use std::time::Duration;
use swarm_engine::RespawnOptions;

#[derive(Args)]
pub struct RespawnArgs {
    /// Worker name
    pub name: String,

    /// Remove and recreate the worktree on the same branch first
    #[arg(long)]
    pub clean_first: bool,

    /// Discard uncommitted changes when recreating the worktree
    #[arg(long, requires = "clean_first")]
    pub force_dirty: bool,

    /// Wait until the agent looks ready for input
    #[arg(long)]
    pub wait_ready: bool,

    /// Readiness timeout in seconds
    #[arg(long, default_value_t = 120, requires = "wait_ready")]
    pub ready_timeout: u64,
}

pub async fn run(engine: &SwarmEngine, args: RespawnArgs) -> anyhow::Result<i32> {
    let spawned = engine
        .respawn(
            &args.name,
            RespawnOptions {
                clean_first: args.clean_first,
                force_dirty: args.force_dirty,
                ready_timeout: args
                    .wait_ready
                    .then(|| Duration::from_secs(args.ready_timeout)),
            },
        )
        .await?;
    println!("respawned {}", spawned.worker.name);
    Ok(0)
}
