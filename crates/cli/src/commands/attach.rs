// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm attach`

use super::SwarmEngine;
use clap::Args;
use swarm_engine::EngineError;

#[derive(Args)]
pub struct AttachArgs {
    /// Worker name
    pub name: String,
}

pub async fn run(engine: &SwarmEngine, args: AttachArgs) -> anyhow::Result<i32> {
    let worker = engine
        .workers()
        .get(&args.name)?
        .ok_or_else(|| EngineError::NotFound(args.name.clone()))?;
    let Some(info) = worker.mux_info() else {
        return Err(EngineError::Validation(format!(
            "worker {} runs as a bare process; use `swarm logs {}` instead",
            args.name, args.name
        ))
        .into());
    };

    let mut cmd = std::process::Command::new("tmux");
    if let Some(socket) = &info.socket {
        cmd.arg("-S").arg(socket);
    }
    // Focus the worker's window, then hand the terminal over to tmux.
    let target = format!("{}:{}", info.session, info.window);
    cmd.args(["select-window", "-t", &target, ";", "attach-session", "-t"])
        .arg(&info.session);
    let status = cmd.status()?;
    Ok(status.code().unwrap_or(1))
}
