// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat records: periodic nudges injected into a worker's input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartbeatStatus {
    Active,
    Paused,
    Expired,
    Stopped,
}

impl std::fmt::Display for HeartbeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeartbeatStatus::Active => write!(f, "active"),
            HeartbeatStatus::Paused => write!(f, "paused"),
            HeartbeatStatus::Expired => write!(f, "expired"),
            HeartbeatStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// One heartbeat schedule, stored under
/// `<state_root>/heartbeats/<worker_name>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub worker_name: String,
    pub interval_seconds: u64,
    #[serde(default)]
    pub expire_at: Option<DateTime<Utc>>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_beat_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub beat_count: u64,
    pub status: HeartbeatStatus,
}

impl HeartbeatRecord {
    pub fn new(
        worker_name: impl Into<String>,
        interval_seconds: u64,
        message: impl Into<String>,
        expire_at: Option<DateTime<Utc>>,
    ) -> Self {
        HeartbeatRecord {
            worker_name: worker_name.into(),
            interval_seconds,
            expire_at,
            message: message.into(),
            created_at: Utc::now(),
            last_beat_at: None,
            beat_count: 0,
            status: HeartbeatStatus::Active,
        }
    }

    /// Whether a beat is due at `now`. The first beat is due one full
    /// interval after creation.
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        let anchor = self.last_beat_at.unwrap_or(self.created_at);
        (now - anchor).num_seconds() >= self.interval_seconds as i64
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|at| now >= at)
    }

    pub fn record_beat(&mut self, now: DateTime<Utc>) {
        self.last_beat_at = Some(now);
        self.beat_count += 1;
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
