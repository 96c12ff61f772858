// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swarm ls`

use super::SwarmEngine;
use clap::Args;
use swarm_core::{WorkerHandle, WorkerRecord};

#[derive(Args)]
pub struct LsArgs {
    /// Only workers carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
}

fn location(worker: &WorkerRecord) -> String {
    match &worker.handle {
        WorkerHandle::Mux(info) => format!("{}:{}", info.session, info.window),
        WorkerHandle::Process(pid) => format!("pid {}", pid),
    }
}

pub async fn run(engine: &SwarmEngine, args: LsArgs) -> anyhow::Result<i32> {
    let mut workers = engine.list_refreshed().await?;
    if let Some(tag) = &args.tag {
        workers.retain(|w| w.tags.contains(tag));
    }
    if workers.is_empty() {
        println!("no workers");
        return Ok(0);
    }

    let name_width = workers
        .iter()
        .map(|w| w.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    println!("{:<name_width$}  {:<8}  {:<24}  TAGS", "NAME", "STATUS", "WHERE");
    for worker in &workers {
        let tags: Vec<&str> = worker.tags.iter().map(String::as_str).collect();
        println!(
            "{:<name_width$}  {:<8}  {:<24}  {}",
            worker.name,
            worker.status.to_string(),
            location(worker),
            tags.join(",")
        );
    }
    Ok(0)
}
