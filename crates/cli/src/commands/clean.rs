// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm clean`

use super::SwarmEngine;
use clap::Args;
use swarm_core::WorkerStatus;
use swarm_engine::CleanOptions;

#[derive(Args)]
pub struct CleanArgs {
    /// Worker names (default: every stopped worker)
    pub names: Vec<String>,

    /// Also remove worktrees
    #[arg(long)]
    pub rm_worktree: bool,

    /// Discard uncommitted changes when removing worktrees
    #[arg(long, requires = "rm_worktree")]
    pub force_dirty: bool,
}

pub async fn run(engine: &SwarmEngine, args: CleanArgs) -> anyhow::Result<i32> {
    let opts = CleanOptions {
        remove_worktree: args.rm_worktree,
        force_dirty: args.force_dirty,
    };

    let names = if args.names.is_empty() {
        engine
            .list_refreshed()
            .await?
            .into_iter()
            .filter(|w| w.status == WorkerStatus::Stopped)
            .map(|w| w.name)
            .collect()
    } else {
        args.names
    };

    for name in &names {
        let outcome = engine.clean(name, opts).await?;
        println!("cleaned {}", name);
        for warning in outcome.warnings {
            eprintln!("swarm: warning: {}", warning);
        }
    }
    Ok(0)
}
