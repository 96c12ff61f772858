// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! swarm - orchestrate AI-agent CLIs as named workers

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    attach, clean, heartbeat, kill, logs, ls, ralph, respawn, send, spawn, status, wait,
    SwarmEngine,
};
use std::path::PathBuf;
use swarm_adapters::{GitWorktree, TmuxMux};
use swarm_engine::{Engine, EngineError};
use swarm_storage::StateRoot;

#[derive(Parser)]
#[command(
    name = "swarm",
    version,
    about = "Swarm - a process manager for concurrent AI-agent CLIs"
)]
struct Cli {
    /// State directory (default: $SWARM_STATE_DIR or ~/.swarm)
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a named worker (mux window or background process)
    Spawn(spawn::SpawnArgs),
    /// Stop a worker (graceful, then forceful)
    Kill(kill::KillArgs),
    /// Restart a worker with its original configuration
    Respawn(respawn::RespawnArgs),
    /// Remove a stopped worker from the registry
    Clean(clean::CleanArgs),
    /// List workers with live status
    Ls(ls::LsArgs),
    /// Show one worker's status (exit 0 running, 1 stopped, 2 unknown)
    Status(status::StatusArgs),
    /// Block until workers stop
    Wait(wait::WaitArgs),
    /// Send literal text (plus Enter) to a worker's window
    Send(send::SendArgs),
    /// Attach the terminal to a worker's window
    Attach(attach::AttachArgs),
    /// Show a process-mode worker's log files
    Logs(logs::LogsArgs),
    /// Autonomous restart loop driving an agent across context windows
    Ralph(ralph::RalphArgs),
    /// Periodic message injection to unblock rate-limited agents
    Heartbeat(heartbeat::HeartbeatArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SWARM_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_engine(state_dir: Option<PathBuf>) -> SwarmEngine {
    let root = match state_dir {
        Some(dir) => StateRoot::new(dir),
        None => StateRoot::discover(),
    };
    Engine::new(root, TmuxMux::new(), GitWorktree::new())
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let engine = build_engine(cli.state_dir);
    match cli.command {
        Commands::Spawn(args) => spawn::run(&engine, args).await,
        Commands::Kill(args) => kill::run(&engine, args).await,
        Commands::Respawn(args) => respawn::run(&engine, args).await,
        Commands::Clean(args) => clean::run(&engine, args).await,
        Commands::Ls(args) => ls::run(&engine, args).await,
        Commands::Status(args) => status::run(&engine, args).await,
        Commands::Wait(args) => wait::run(&engine, args).await,
        Commands::Send(args) => send::run(&engine, args).await,
        Commands::Attach(args) => attach::run(&engine, args).await,
        Commands::Logs(args) => logs::run(&engine, args).await,
        Commands::Ralph(args) => ralph::run(&engine, args).await,
        Commands::Heartbeat(args) => heartbeat::run(&engine, args).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("swarm: error: {:#}", err);
            err.downcast_ref::<EngineError>()
                .map(EngineError::exit_code)
                .unwrap_or(1)
        }
    };
    std::process::exit(code);
}
