// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm status`

use super::SwarmEngine;
use clap::Args;
use swarm_core::WorkerStatus;

#[derive(Args)]
pub struct StatusArgs {
    /// Worker name
    pub name: String,
}

pub async fn run(engine: &SwarmEngine, args: StatusArgs) -> anyhow::Result<i32> {
    let Some(worker) = engine.get_refreshed(&args.name).await? else {
        eprintln!("swarm: error: worker not found: {}", args.name);
        return Ok(2);
    };
    println!("{} {}", worker.name, worker.status);
    if let Some(info) = &worker.worktree {
        println!("worktree {} ({})", info.path.display(), info.branch);
    }
    Ok(match worker.status {
        WorkerStatus::Running => 0,
        WorkerStatus::Stopped => 1,
    })
}
