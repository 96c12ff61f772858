// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm heartbeat` - periodic nudges for rate-limited agents

use super::SwarmEngine;
use chrono::Utc;
use clap::{Args, Subcommand};
use swarm_engine::{EngineError, HeartbeatExit};

#[derive(Args)]
pub struct HeartbeatArgs {
    #[command(subcommand)]
    pub command: HeartbeatCommands,
}

#[derive(Subcommand)]
pub enum HeartbeatCommands {
    /// Create a heartbeat and run its scheduler in the foreground
    Start(StartArgs),
    /// Run the scheduler for an already-created heartbeat
    Run(NameArg),
    /// Show the heartbeat record
    Status(NameArg),
    Pause(NameArg),
    Resume(NameArg),
    Stop(NameArg),
}

#[derive(Args)]
pub struct NameArg {
    /// Worker name
    pub name: String,
}

#[derive(Args)]
pub struct StartArgs {
    /// Worker name
    pub name: String,

    /// Seconds between beats
    #[arg(long, default_value_t = 900)]
    pub interval: u64,

    /// Message injected at each beat
    #[arg(long, default_value = "Please continue with the task.")]
    pub message: String,

    /// Stop beating after this many seconds
    #[arg(long, value_name = "SECS")]
    pub expire_in: Option<u64>,
}

pub async fn run(engine: &SwarmEngine, args: HeartbeatArgs) -> anyhow::Result<i32> {
    match args.command {
        HeartbeatCommands::Start(start) => {
            let expire_at = start
                .expire_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs as i64));
            engine
                .heartbeat_create(&start.name, start.interval, &start.message, expire_at)
                .await?;
            println!(
                "heartbeat for {} every {}s; monitoring",
                start.name, start.interval
            );
            finish(engine.heartbeat_run(&start.name).await?)
        }
        HeartbeatCommands::Run(arg) => finish(engine.heartbeat_run(&arg.name).await?),
        HeartbeatCommands::Status(arg) => {
            let record = engine
                .heartbeats()
                .load(&arg.name)?
                .ok_or_else(|| EngineError::NotFound(arg.name.clone()))?;
            println!(
                "heartbeat {}: {} every {}s, {} beat(s)",
                record.worker_name, record.status, record.interval_seconds, record.beat_count
            );
            if let Some(at) = record.last_beat_at {
                println!("last beat: {}", at.to_rfc3339());
            }
            if let Some(at) = record.expire_at {
                println!("expires: {}", at.to_rfc3339());
            }
            Ok(0)
        }
        HeartbeatCommands::Pause(arg) => {
            engine.heartbeat_pause(&arg.name)?;
            println!("heartbeat for {} paused", arg.name);
            Ok(0)
        }
        HeartbeatCommands::Resume(arg) => {
            engine.heartbeat_resume(&arg.name)?;
            println!("heartbeat for {} resumed", arg.name);
            Ok(0)
        }
        HeartbeatCommands::Stop(arg) => {
            engine.heartbeat_stop(&arg.name)?;
            println!("heartbeat for {} stopped", arg.name);
            Ok(0)
        }
    }
}

fn finish(exit: HeartbeatExit) -> anyhow::Result<i32> {
    match exit {
        HeartbeatExit::Expired => println!("heartbeat expired"),
        HeartbeatExit::WorkerStopped => println!("worker stopped; heartbeat ended"),
        HeartbeatExit::Stopped => println!("heartbeat stopped"),
    }
    Ok(0)
}
