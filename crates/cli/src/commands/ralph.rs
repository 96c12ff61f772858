// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm ralph` - the autonomous restart loop

use super::spawn::{build_spec, SpawnArgs};
use super::SwarmEngine;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use swarm_core::{RalphRecord, DEFAULT_INACTIVITY_TIMEOUT_SECS};
use swarm_engine::{EngineError, RalphOptions};

#[derive(Args)]
pub struct RalphArgs {
    #[command(subcommand)]
    pub command: RalphCommands,
}

#[derive(Subcommand)]
pub enum RalphCommands {
    /// Start a loop and monitor it in the foreground
    Start(StartArgs),
    /// Show loop progress and ETA
    Status(NameArg),
    /// Stop re-spawning after the current agent finishes
    Pause(NameArg),
    /// Reattach and continue a paused or disconnected loop
    Resume(NameArg),
}

#[derive(Args)]
pub struct NameArg {
    /// Worker name
    pub name: String,
}

#[derive(Args)]
pub struct StartArgs {
    /// Prompt file, re-read at every iteration
    #[arg(long, value_name = "FILE")]
    pub prompt_file: PathBuf,

    /// Iteration cap
    #[arg(long, default_value_t = 25)]
    pub max_iterations: u32,

    /// Regex ending the loop when the agent prints it
    #[arg(long)]
    pub done_pattern: Option<String>,

    /// Seconds of unchanged screen before the agent is restarted
    #[arg(long, default_value_t = DEFAULT_INACTIVITY_TIMEOUT_SECS)]
    pub inactivity_timeout: u64,

    /// Check the done pattern continuously while monitoring
    #[arg(long)]
    pub check_done_continuous: bool,

    #[command(flatten)]
    pub spawn: SpawnArgs,
}

pub async fn run(engine: &SwarmEngine, args: RalphArgs) -> anyhow::Result<i32> {
    match args.command {
        RalphCommands::Start(start) => {
            let spec = build_spec(&start.spawn)?;
            let mut opts = RalphOptions::new(start.prompt_file.clone(), start.max_iterations);
            opts.done_pattern = start.done_pattern.clone();
            opts.inactivity_timeout_seconds = start.inactivity_timeout;
            opts.check_done_continuous = start.check_done_continuous;

            let record = engine.ralph_start(spec, opts).await?;
            print_summary(&record);
            Ok(exit_for(&record))
        }
        RalphCommands::Status(arg) => {
            let record = engine
                .ralphs()
                .load(&arg.name)?
                .ok_or_else(|| EngineError::NotFound(arg.name.clone()))?;
            print_summary(&record);
            Ok(0)
        }
        RalphCommands::Pause(arg) => {
            let record = engine.ralph_pause(&arg.name)?;
            println!("loop for {} paused", record.worker_name);
            Ok(0)
        }
        RalphCommands::Resume(arg) => {
            let record = engine.ralph_resume(&arg.name).await?;
            print_summary(&record);
            Ok(exit_for(&record))
        }
    }
}

fn exit_for(record: &RalphRecord) -> i32 {
    match record.status {
        swarm_core::RalphStatus::Failed => 1,
        _ => 0,
    }
}

fn print_summary(record: &RalphRecord) {
    println!(
        "loop {}: {} iteration {}/{}",
        record.worker_name, record.status, record.current_iteration, record.max_iterations
    );
    if let Some(reason) = record.exit_reason {
        println!("exit reason: {}", reason);
    }
    if let Some(mean) = record.mean_iteration_secs() {
        println!("mean iteration: {:.0}s", mean);
    }
    if record.status == swarm_core::RalphStatus::Running {
        if let Some(eta) = record.eta_seconds() {
            println!("eta: {:.0}s", eta);
        }
    }
    if record.total_failures > 0 {
        println!(
            "failures: {} total, {} consecutive",
            record.total_failures, record.consecutive_failures
        );
    }
}
