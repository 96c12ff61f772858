// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm spawn`

use super::SwarmEngine;
use clap::Args;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;
use swarm_core::parse_env_pair;
use swarm_engine::{SpawnMode, SpawnReadiness, SpawnSpec, WorktreeSpec};

#[derive(Args)]
pub struct SpawnArgs {
    /// Worker name (unique; doubles as the mux window name)
    pub name: String,

    /// Run as a bare background process instead of a mux window
    #[arg(long)]
    pub process: bool,

    /// Mux session name (default: shared per-project session)
    #[arg(long, conflicts_with = "process")]
    pub session: Option<String>,

    /// Mux server socket path (default server when omitted)
    #[arg(long, conflicts_with = "process")]
    pub socket: Option<String>,

    /// Create a dedicated git worktree from this repository
    #[arg(long, value_name = "REPO")]
    pub worktree: Option<PathBuf>,

    /// Worktree branch (default: swarm/<name>)
    #[arg(long, requires = "worktree")]
    pub branch: Option<String>,

    /// Worktree location (default: <repo>-worktrees/<name>)
    #[arg(long, requires = "worktree", value_name = "DIR")]
    pub worktree_path: Option<PathBuf>,

    /// Environment entries KEY=VALUE (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Tags for filtering (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Working directory (default: current directory; worktree wins)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Wait until the agent looks ready for input
    #[arg(long)]
    pub wait_ready: bool,

    /// Readiness timeout in seconds
    #[arg(long, default_value_t = 120, requires = "wait_ready")]
    pub ready_timeout: u64,

    /// The command to run
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

pub fn build_spec(args: &SpawnArgs) -> anyhow::Result<SpawnSpec> {
    let mut env = BTreeMap::new();
    for entry in &args.env {
        let (key, value) = parse_env_pair(entry)?;
        env.insert(key, value);
    }

    let mode = if args.process {
        SpawnMode::Process
    } else {
        SpawnMode::Mux {
            session: args.session.clone(),
            socket: args.socket.clone(),
        }
    };

    let mut spec = SpawnSpec::new(&args.name, args.command.clone(), mode);
    spec.worktree = args.worktree.as_ref().map(|repo| WorktreeSpec {
        base_repo: repo.clone(),
        branch: args.branch.clone(),
        path: args.worktree_path.clone(),
    });
    spec.env = env;
    spec.tags = args.tags.iter().cloned().collect::<BTreeSet<_>>();
    spec.cwd = args.cwd.clone();
    if args.wait_ready {
        spec.ready_timeout = Some(Duration::from_secs(args.ready_timeout));
    }
    Ok(spec)
}

pub async fn run(engine: &SwarmEngine, args: SpawnArgs) -> anyhow::Result<i32> {
    let spec = build_spec(&args)?;
    let spawned = engine.spawn(spec).await?;

    match &spawned.worker.handle {
        swarm_core::WorkerHandle::Mux(info) => {
            println!(
                "spawned {} in {}:{}",
                spawned.worker.name, info.session, info.window
            );
        }
        swarm_core::WorkerHandle::Process(pid) => {
            println!("spawned {} (pid {})", spawned.worker.name, pid);
        }
    }
    match spawned.readiness {
        SpawnReadiness::TimedOut => {
            eprintln!(
                "swarm: warning: {} not ready before timeout; it is still running",
                spawned.worker.name
            );
        }
        SpawnReadiness::Blocked { pattern } => {
            eprintln!(
                "swarm: warning: {} is waiting on an interactive setup screen (matched {:?})",
                spawned.worker.name, pattern
            );
        }
        SpawnReadiness::Ready { .. } | SpawnReadiness::NotRequested => {}
    }
    Ok(0)
}
