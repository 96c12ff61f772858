// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm wait`

use super::SwarmEngine;
use clap::Args;
use std::time::Duration;
use swarm_core::WorkerStatus;
use swarm_engine::EngineError;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Args)]
pub struct WaitArgs {
    /// Worker names (default: all registered workers)
    pub names: Vec<String>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(engine: &SwarmEngine, args: WaitArgs) -> anyhow::Result<i32> {
    let names: Vec<String> = if args.names.is_empty() {
        engine
            .workers()
            .list_all()?
            .into_iter()
            .map(|w| w.name)
            .collect()
    } else {
        for name in &args.names {
            if engine.workers().get(name)?.is_none() {
                return Err(EngineError::NotFound(name.clone()).into());
            }
        }
        args.names
    };

    let deadline = args
        .timeout
        .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));

    loop {
        let mut pending = Vec::new();
        for name in &names {
            if let Some(worker) = engine.get_refreshed(name).await? {
                if worker.status == WorkerStatus::Running {
                    pending.push(name.clone());
                }
            }
        }
        if pending.is_empty() {
            // Waiting is a mutating command: record what we observed.
            for name in &names {
                if engine.workers().get(name)?.is_some() {
                    engine
                        .workers()
                        .update(name, |w| w.status = WorkerStatus::Stopped)?;
                }
            }
            println!("all workers stopped");
            return Ok(0);
        }
        if let Some(deadline) = deadline {
            if tokio::time::Instant::now() >= deadline {
                for name in &pending {
                    eprintln!("swarm: error: timed out waiting for {}", name);
                }
                return Ok(1);
            }
        }
        tokio::time::sleep(WAIT_POLL_INTERVAL).await;
    }
}
