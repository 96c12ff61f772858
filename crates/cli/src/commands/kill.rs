// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm kill`

use super::SwarmEngine;
use clap::Args;
use swarm_engine::KillOptions;

#[derive(Args)]
pub struct KillArgs {
    /// Worker names
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Also remove the worker's worktree
    #[arg(long)]
    pub rm_worktree: bool,

    /// Discard uncommitted changes when removing the worktree
    #[arg(long, requires = "rm_worktree")]
    pub force_dirty: bool,
}

pub async fn run(engine: &SwarmEngine, args: KillArgs) -> anyhow::Result<i32> {
    for name in &args.names {
        let outcome = engine
            .kill(
                name,
                KillOptions {
                    remove_worktree: args.rm_worktree,
                    force_dirty: args.force_dirty,
                },
            )
            .await?;
        println!("killed {}", name);
        for warning in outcome.warnings {
            eprintln!("swarm: warning: {}", warning);
        }
    }
    Ok(0)
}
