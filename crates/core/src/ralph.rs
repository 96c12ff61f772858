// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ralph loop records: per-worker restart-loop state and its journal events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Loop lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RalphStatus {
    Running,
    Paused,
    Stopped,
    Failed,
}

impl RalphStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RalphStatus::Stopped | RalphStatus::Failed)
    }
}

impl std::fmt::Display for RalphStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RalphStatus::Running => write!(f, "running"),
            RalphStatus::Paused => write!(f, "paused"),
            RalphStatus::Stopped => write!(f, "stopped"),
            RalphStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Why a loop reached a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    DonePattern,
    MaxIterations,
    Killed,
    Failed,
    MonitorDisconnected,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::DonePattern => write!(f, "done_pattern"),
            ExitReason::MaxIterations => write!(f, "max_iterations"),
            ExitReason::Killed => write!(f, "killed"),
            ExitReason::Failed => write!(f, "failed"),
            ExitReason::MonitorDisconnected => write!(f, "monitor_disconnected"),
        }
    }
}

/// Event kinds appended to `iterations.log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Start,
    End,
    Done,
    Fail,
    Pause,
    Resume,
}

impl std::fmt::Display for LoopEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopEvent::Start => write!(f, "START"),
            LoopEvent::End => write!(f, "END"),
            LoopEvent::Done => write!(f, "DONE"),
            LoopEvent::Fail => write!(f, "FAIL"),
            LoopEvent::Pause => write!(f, "PAUSE"),
            LoopEvent::Resume => write!(f, "RESUME"),
        }
    }
}

pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 180;

fn default_inactivity_timeout() -> u64 {
    DEFAULT_INACTIVITY_TIMEOUT_SECS
}

/// Persistent state of one ralph loop, stored under
/// `<state_root>/ralph/<worker_name>/state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RalphRecord {
    pub worker_name: String,
    pub prompt_file_path: PathBuf,
    pub max_iterations: u32,
    #[serde(default)]
    pub current_iteration: u32,
    pub status: RalphStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub iteration_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub iteration_ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub iteration_durations: Vec<f64>,
    #[serde(default)]
    pub consecutive_failures: u32,
    #[serde(default)]
    pub total_failures: u32,
    #[serde(default)]
    pub done_pattern: Option<String>,
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_seconds: u64,
    #[serde(default)]
    pub check_done_continuous: bool,
    #[serde(default)]
    pub exit_reason: Option<ExitReason>,
    #[serde(default)]
    pub prompt_baseline_content: String,
}

impl RalphRecord {
    pub fn new(
        worker_name: impl Into<String>,
        prompt_file_path: PathBuf,
        max_iterations: u32,
    ) -> Self {
        RalphRecord {
            worker_name: worker_name.into(),
            prompt_file_path,
            max_iterations,
            current_iteration: 0,
            status: RalphStatus::Running,
            started_at: Utc::now(),
            iteration_started_at: None,
            iteration_ended_at: None,
            iteration_durations: Vec::new(),
            consecutive_failures: 0,
            total_failures: 0,
            done_pattern: None,
            inactivity_timeout_seconds: DEFAULT_INACTIVITY_TIMEOUT_SECS,
            check_done_continuous: false,
            exit_reason: None,
            prompt_baseline_content: String::new(),
        }
    }

    /// Record an iteration start.
    pub fn begin_iteration(&mut self, now: DateTime<Utc>) {
        self.current_iteration += 1;
        self.iteration_started_at = Some(now);
        self.iteration_ended_at = None;
    }

    /// Record an iteration end, pushing its duration for ETA math.
    pub fn end_iteration(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.iteration_started_at {
            let secs = (now - started).num_milliseconds() as f64 / 1000.0;
            self.iteration_durations.push(secs.max(0.0));
        }
        self.iteration_ended_at = Some(now);
    }

    /// A zero-exit iteration resets the consecutive-failure counter.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.total_failures += 1;
    }

    /// Transition to a terminal status. The exit reason is always set on
    /// terminal transitions.
    pub fn finish(&mut self, reason: ExitReason) {
        self.status = match reason {
            ExitReason::Failed => RalphStatus::Failed,
            _ => RalphStatus::Stopped,
        };
        self.exit_reason = Some(reason);
    }

    /// Mean iteration duration in seconds, if any iteration has finished.
    pub fn mean_iteration_secs(&self) -> Option<f64> {
        if self.iteration_durations.is_empty() {
            return None;
        }
        Some(self.iteration_durations.iter().sum::<f64>() / self.iteration_durations.len() as f64)
    }

    /// Estimated seconds remaining until the iteration cap.
    pub fn eta_seconds(&self) -> Option<f64> {
        let remaining = self.max_iterations.saturating_sub(self.current_iteration);
        Some(self.mean_iteration_secs()? * remaining as f64)
    }
}

/// Backoff before the next iteration after `consecutive_failures` non-zero
/// exits: 1, 2, 4, 8, ... seconds, capped at 300.
pub fn failure_backoff_secs(consecutive_failures: u32) -> u64 {
    if consecutive_failures == 0 {
        return 0;
    }
    let exp = consecutive_failures.saturating_sub(1).min(63);
    2u64.saturating_pow(exp).min(300)
}

/// Consecutive non-zero exits tolerated before the loop fails.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;

#[cfg(test)]
#[path = "ralph_tests.rs"]
mod tests;
