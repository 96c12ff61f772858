// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat scheduler: periodic message injection into a worker's input.

use crate::engine::Engine;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use swarm_adapters::{ControlKey, MuxAdapter, WorktreeAdapter};
use swarm_core::{HeartbeatRecord, HeartbeatStatus, WorkerStatus};

/// Decision cadence: the scheduler wakes this often to ask "is a beat
/// due". Driven by the tokio timer, which is monotonic, so wall-clock
/// jumps do not skew the cadence.
pub const HEARTBEAT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Why a heartbeat run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatExit {
    Expired,
    WorkerStopped,
    Stopped,
}

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    /// Create (or replace) the heartbeat record for a worker. The worker
    /// must exist and live in the multiplexer; there is no input to nudge
    /// otherwise.
    pub async fn heartbeat_create(
        &self,
        worker_name: &str,
        interval_seconds: u64,
        message: &str,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<HeartbeatRecord, EngineError> {
        if interval_seconds == 0 {
            return Err(EngineError::Validation(
                "heartbeat interval must be positive".to_string(),
            ));
        }
        let worker = self
            .workers()
            .get(worker_name)?
            .ok_or_else(|| EngineError::NotFound(worker_name.to_string()))?;
        if worker.mux_info().is_none() {
            return Err(EngineError::Validation(format!(
                "worker {} runs as a bare process; heartbeats need a mux window",
                worker_name
            )));
        }
        let record = HeartbeatRecord::new(worker_name, interval_seconds, message, expire_at);
        self.heartbeats().save(&record)?;
        Ok(record)
    }

    /// Run the scheduler for one worker until its heartbeat expires, the
    /// worker dies, or the record is stopped.
    pub async fn heartbeat_run(&self, worker_name: &str) -> Result<HeartbeatExit, EngineError> {
        self.heartbeat_run_with_poll(worker_name, HEARTBEAT_POLL_INTERVAL)
            .await
    }

    /// Scheduler loop with an explicit decision cadence.
    pub async fn heartbeat_run_with_poll(
        &self,
        worker_name: &str,
        poll: Duration,
    ) -> Result<HeartbeatExit, EngineError> {
        loop {
            let Some(record) = self.heartbeats().load(worker_name)? else {
                return Ok(HeartbeatExit::Stopped);
            };

            match record.status {
                HeartbeatStatus::Stopped => return Ok(HeartbeatExit::Stopped),
                HeartbeatStatus::Expired => return Ok(HeartbeatExit::Expired),
                HeartbeatStatus::Paused => {
                    // Paused: send nothing, but stay attached for resume.
                }
                HeartbeatStatus::Active => {
                    let now = Utc::now();
                    if record.expired(now) {
                        self.heartbeats()
                            .update(worker_name, |hb| hb.status = HeartbeatStatus::Expired)?;
                        tracing::info!(worker_name, "heartbeat expired");
                        return Ok(HeartbeatExit::Expired);
                    }
                    if record.due(now) {
                        if !self.beat(worker_name, &record, now).await? {
                            return Ok(HeartbeatExit::WorkerStopped);
                        }
                    }
                }
            }

            tokio::time::sleep(poll).await;
        }
    }

    /// Deliver one beat. Returns false (and stops the record) when the
    /// worker is gone, stopped, or not a mux worker.
    async fn beat(
        &self,
        worker_name: &str,
        record: &HeartbeatRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let worker = self.get_refreshed(worker_name).await?;
        let Some(worker) = worker else {
            self.heartbeats()
                .update(worker_name, |hb| hb.status = HeartbeatStatus::Stopped)?;
            tracing::info!(worker_name, "worker gone; heartbeat stopped");
            return Ok(false);
        };
        let Some(info) = worker.mux_info() else {
            self.heartbeats()
                .update(worker_name, |hb| hb.status = HeartbeatStatus::Stopped)?;
            return Ok(false);
        };
        if worker.status != WorkerStatus::Running {
            self.heartbeats()
                .update(worker_name, |hb| hb.status = HeartbeatStatus::Stopped)?;
            tracing::info!(worker_name, "worker stopped; heartbeat stopped");
            return Ok(false);
        }

        let mux = self.mux_for(&worker);
        mux.send_text(&info.session, &info.window, &record.message)
            .await?;
        mux.send_key(&info.session, &info.window, ControlKey::Enter)
            .await?;
        let updated = self
            .heartbeats()
            .update(worker_name, |hb| hb.record_beat(now))?;
        tracing::debug!(worker_name, beat_count = updated.beat_count, "heartbeat sent");
        Ok(true)
    }

    pub fn heartbeat_pause(&self, worker_name: &str) -> Result<HeartbeatRecord, EngineError> {
        Ok(self.heartbeats().update(worker_name, |hb| {
            if hb.status == HeartbeatStatus::Active {
                hb.status = HeartbeatStatus::Paused;
            }
        })?)
    }

    pub fn heartbeat_resume(&self, worker_name: &str) -> Result<HeartbeatRecord, EngineError> {
        Ok(self.heartbeats().update(worker_name, |hb| {
            if hb.status == HeartbeatStatus::Paused {
                hb.status = HeartbeatStatus::Active;
            }
        })?)
    }

    pub fn heartbeat_stop(&self, worker_name: &str) -> Result<HeartbeatRecord, EngineError> {
        Ok(self
            .heartbeats()
            .update(worker_name, |hb| hb.status = HeartbeatStatus::Stopped)?)
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
