// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm send`

use super::SwarmEngine;
use clap::Args;
use swarm_adapters::{ControlKey, MuxAdapter};
use swarm_engine::EngineError;

#[derive(Args)]
pub struct SendArgs {
    /// Worker name
    pub name: String,

    /// Text sent literally, followed by Enter
    pub text: String,

    /// Skip the trailing Enter
    #[arg(long)]
    pub no_enter: bool,
}

pub async fn run(engine: &SwarmEngine, args: SendArgs) -> anyhow::Result<i32> {
    let worker = engine
        .workers()
        .get(&args.name)?
        .ok_or_else(|| EngineError::NotFound(args.name.clone()))?;
    let Some(info) = worker.mux_info() else {
        return Err(EngineError::Validation(format!(
            "worker {} runs as a bare process; there is no input to send to",
            args.name
        ))
        .into());
    };

    let mux = engine.mux_for(&worker);
    mux.send_text(&info.session, &info.window, &args.text)
        .await
        .map_err(EngineError::from)?;
    if !args.no_enter {
        mux.send_key(&info.session, &info.window, ControlKey::Enter)
            .await
            .map_err(EngineError::from)?;
    }
    Ok(0)
}
