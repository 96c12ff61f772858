// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm logs`

use super::SwarmEngine;
use clap::Args;
use std::io::{Read, Seek, SeekFrom};
use swarm_engine::EngineError;

#[derive(Args)]
pub struct LogsArgs {
    /// Worker name
    pub name: String,

    /// Show stderr instead of stdout
    #[arg(long)]
    pub stderr: bool,

    /// Number of trailing lines to show
    #[arg(short = 'n', long, default_value_t = 50)]
    pub lines: usize,

    /// Keep streaming as the log grows
    #[arg(short, long)]
    pub follow: bool,
}

pub async fn run(engine: &SwarmEngine, args: LogsArgs) -> anyhow::Result<i32> {
    if engine.workers().get(&args.name)?.is_none() {
        return Err(EngineError::NotFound(args.name.clone()).into());
    }
    let root = engine.state_root();
    let path = if args.stderr {
        root.stderr_log_path(&args.name)
    } else {
        root.stdout_log_path(&args.name)
    };

    let content = std::fs::read_to_string(&path).unwrap_or_default();
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(args.lines);
    for line in &lines[start..] {
        println!("{}", line);
    }

    if args.follow {
        let mut offset = content.len() as u64;
        loop {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            let Ok(mut file) = std::fs::File::open(&path) else {
                continue;
            };
            let len = file.metadata()?.len();
            if len <= offset {
                continue;
            }
            file.seek(SeekFrom::Start(offset))?;
            let mut fresh = String::new();
            file.read_to_string(&mut fresh)?;
            print!("{}", fresh);
            offset = len;
        }
    }
    Ok(0)
}
