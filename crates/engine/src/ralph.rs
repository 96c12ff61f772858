// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ralph restart loop: re-invoke an agent across fresh context
//! windows until a done-signal, the iteration cap, or the failure budget.

use crate::detect::{
    await_ready, baseline_line_count, matches_after_baseline, monitor_window, MonitorEvent,
    MonitorOptions, Readiness, CAPTURE_HISTORY_LINES, DEFAULT_READY_TIMEOUT,
};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::session::window_command;
use crate::spawn::{SpawnMode, SpawnReadiness, SpawnSpec};
use chrono::Utc;
use regex::Regex;
use std::time::Duration;
use swarm_adapters::{ControlKey, MuxAdapter, MuxError, WorktreeAdapter};
use swarm_core::{
    failure_backoff_secs, ExitReason, LoopEvent, MuxInfo, RalphRecord, RalphStatus,
    WorkerMetadata, WorkerRecord, DEFAULT_INACTIVITY_TIMEOUT_SECS, MAX_CONSECUTIVE_FAILURES,
};

/// Loop configuration beyond the worker spawn itself.
#[derive(Debug, Clone)]
pub struct RalphOptions {
    pub prompt_file: std::path::PathBuf,
    pub max_iterations: u32,
    pub done_pattern: Option<String>,
    pub inactivity_timeout_seconds: u64,
    pub check_done_continuous: bool,
}

impl RalphOptions {
    pub fn new(prompt_file: std::path::PathBuf, max_iterations: u32) -> Self {
        RalphOptions {
            prompt_file,
            max_iterations,
            done_pattern: None,
            inactivity_timeout_seconds: DEFAULT_INACTIVITY_TIMEOUT_SECS,
            check_done_continuous: false,
        }
    }
}

impl<M: MuxAdapter, W: WorktreeAdapter> Engine<M, W> {
    /// Start a new loop: persist its record, spawn the worker, and run
    /// the monitor until a terminal state.
    pub async fn ralph_start(
        &self,
        mut spawn: SpawnSpec,
        opts: RalphOptions,
    ) -> Result<RalphRecord, EngineError> {
        let name = spawn.name.clone();
        let done_pattern = compile_done_pattern(opts.done_pattern.as_deref())?;
        if !matches!(spawn.mode, SpawnMode::Mux { .. }) {
            return Err(EngineError::Validation(
                "ralph loops require a mux-mode worker".to_string(),
            ));
        }
        if opts.max_iterations == 0 {
            return Err(EngineError::Validation(
                "max iterations must be positive".to_string(),
            ));
        }

        // A record left in running state means a previous monitor died
        // (or is still alive). Never steal its worker: mark the divergence
        // and tell the caller to resume.
        if let Some(existing) = self.ralphs().load(&name)? {
            if existing.status == RalphStatus::Running {
                self.ralphs().update(&name, |r| {
                    r.status = RalphStatus::Stopped;
                    r.exit_reason = Some(ExitReason::MonitorDisconnected);
                })?;
                return Err(EngineError::Ralph(format!(
                    "loop for {} was already running (monitor disconnected); \
                     use `swarm ralph resume {}` to reattach",
                    name, name
                )));
            }
        }

        let mut record = RalphRecord::new(&name, opts.prompt_file.clone(), opts.max_iterations);
        record.done_pattern = opts.done_pattern.clone();
        record.inactivity_timeout_seconds = opts.inactivity_timeout_seconds;
        record.check_done_continuous = opts.check_done_continuous;
        self.ralphs().save(&record)?;

        spawn.metadata = Some(WorkerMetadata {
            ralph: true,
            ralph_iteration: 0,
        });
        spawn.remain_on_exit = true;
        if spawn.ready_timeout.is_none() {
            spawn.ready_timeout = Some(DEFAULT_READY_TIMEOUT);
        }

        let spawned = match self.spawn(spawn).await {
            Ok(spawned) => spawned,
            Err(err) => {
                self.ralphs().update(&name, |r| r.finish(ExitReason::Failed))?;
                self.ralphs()
                    .append_iteration_log(&name, LoopEvent::Fail, &err.to_string())?;
                return Err(err);
            }
        };

        if let SpawnReadiness::Blocked { pattern } = &spawned.readiness {
            return self.abort_blocked(&name, pattern).await;
        }

        self.run_loop(&name, done_pattern).await
    }

    /// Reattach to an existing loop: paused, failed, or left behind by a
    /// disconnected monitor.
    pub async fn ralph_resume(&self, name: &str) -> Result<RalphRecord, EngineError> {
        let record = self
            .ralphs()
            .load(name)?
            .ok_or_else(|| EngineError::NotFound(name.to_string()))?;

        match record.status {
            RalphStatus::Running => {
                return Err(EngineError::Ralph(format!(
                    "loop for {} is already running",
                    name
                )));
            }
            RalphStatus::Stopped
                if !matches!(
                    record.exit_reason,
                    Some(ExitReason::MonitorDisconnected) | Some(ExitReason::Killed)
                ) =>
            {
                return Err(EngineError::Ralph(format!(
                    "loop for {} already finished ({}); start a new loop",
                    name,
                    record
                        .exit_reason
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "stopped".to_string())
                )));
            }
            _ => {}
        }

        let done_pattern = compile_done_pattern(record.done_pattern.as_deref())?;
        self.ralphs().update(name, |r| {
            r.status = RalphStatus::Running;
            r.exit_reason = None;
            // A resumed loop gets a fresh failure budget.
            r.consecutive_failures = 0;
        })?;
        self.ralphs()
            .append_iteration_log(name, LoopEvent::Resume, "loop resumed")?;

        self.run_loop(name, done_pattern).await
    }

    /// Pause: the current agent is not interrupted; the loop stops
    /// re-spawning once it exits or goes inactive.
    pub fn ralph_pause(&self, name: &str) -> Result<RalphRecord, EngineError> {
        let record = self.ralphs().update(name, |r| {
            if r.status == RalphStatus::Running {
                r.status = RalphStatus::Paused;
            }
        })?;
        self.ralphs()
            .append_iteration_log(name, LoopEvent::Pause, "pause requested")?;
        Ok(record)
    }

    async fn abort_blocked(
        &self,
        name: &str,
        pattern: &str,
    ) -> Result<RalphRecord, EngineError> {
        self.ralphs().update(name, |r| r.finish(ExitReason::Failed))?;
        let diagnostic = format!(
            "agent is stuck on an interactive setup screen (matched {:?}); \
             attach to the worker window, finish setup, then resume the loop",
            pattern
        );
        self.ralphs()
            .append_iteration_log(name, LoopEvent::Fail, &diagnostic)?;
        Err(EngineError::Ralph(diagnostic))
    }

    async fn run_loop(
        &self,
        name: &str,
        done_pattern: Option<Regex>,
    ) -> Result<RalphRecord, EngineError> {
        loop {
            // External pause/kill takes effect at this boundary.
            let record = self
                .ralphs()
                .load(name)?
                .ok_or_else(|| EngineError::Ralph(format!("loop state for {} vanished", name)))?;
            match record.status {
                RalphStatus::Running => {}
                RalphStatus::Paused => {
                    tracing::info!(name, "loop paused; not re-spawning");
                    return Ok(record);
                }
                RalphStatus::Stopped | RalphStatus::Failed => return Ok(record),
            }

            if record.current_iteration >= record.max_iterations {
                let record = self
                    .ralphs()
                    .update(name, |r| r.finish(ExitReason::MaxIterations))?;
                self.ralphs().append_iteration_log(
                    name,
                    LoopEvent::End,
                    &format!("reached max iterations ({})", record.max_iterations),
                )?;
                return Ok(record);
            }

            // Re-read the prompt every iteration; edits take effect on
            // the next context window.
            let prompt = match std::fs::read_to_string(&record.prompt_file_path) {
                Ok(prompt) => prompt,
                Err(e) => {
                    let diagnostic = format!(
                        "prompt file {} unreadable: {}",
                        record.prompt_file_path.display(),
                        e
                    );
                    self.ralphs().update(name, |r| r.finish(ExitReason::Failed))?;
                    self.ralphs()
                        .append_iteration_log(name, LoopEvent::Fail, &diagnostic)?;
                    return Err(EngineError::Ralph(diagnostic));
                }
            };

            // The worker registry record carries the spawn template
            // (command, env, cwd, session) across iterations.
            let Some(worker) = self.workers().get(name)? else {
                let record = self
                    .ralphs()
                    .update(name, |r| r.finish(ExitReason::Killed))?;
                self.ralphs().append_iteration_log(
                    name,
                    LoopEvent::End,
                    "worker record removed from registry",
                )?;
                return Ok(record);
            };
            let Some(info) = worker.mux_info().cloned() else {
                let diagnostic = "ralph worker is not running in the multiplexer".to_string();
                self.ralphs().update(name, |r| r.finish(ExitReason::Failed))?;
                self.ralphs()
                    .append_iteration_log(name, LoopEvent::Fail, &diagnostic)?;
                return Err(EngineError::Ralph(diagnostic));
            };
            let mux = self.mux_for(&worker);

            if let Some(abort) = self
                .ensure_agent_window(name, &worker, &info, &record)
                .await?
            {
                return abort;
            }

            // Iteration bookkeeping before injection.
            let record = self.ralphs().update(name, |r| {
                r.begin_iteration(Utc::now());
            })?;
            self.workers().update(name, |w| {
                let meta = w.metadata.get_or_insert_with(WorkerMetadata::default);
                meta.ralph = true;
                meta.ralph_iteration = u64::from(record.current_iteration);
            })?;
            self.ralphs().append_iteration_log(
                name,
                LoopEvent::Start,
                &format!(
                    "iteration {}/{}",
                    record.current_iteration, record.max_iterations
                ),
            )?;

            // Inject the prompt: pre-clear any autocomplete overlay, then
            // literal text, then Enter.
            mux.send_key(&info.session, &info.window, ControlKey::Escape)
                .await?;
            mux.send_key(&info.session, &info.window, ControlKey::CtrlU)
                .await?;
            mux.send_text(&info.session, &info.window, prompt.trim_end())
                .await?;
            mux.send_key(&info.session, &info.window, ControlKey::Enter)
                .await?;

            // Baseline for done-pattern self-match prevention.
            let baseline = match mux
                .capture_pane(&info.session, &info.window, CAPTURE_HISTORY_LINES)
                .await
            {
                Ok(capture) => capture,
                Err(MuxError::TargetMissing(_)) => String::new(),
                Err(e) => return Err(e.into()),
            };
            let baseline_lines = baseline_line_count(&baseline);
            self.ralphs()
                .update(name, |r| r.prompt_baseline_content = baseline)?;

            let outcome = monitor_window(
                &mux,
                &info.session,
                &info.window,
                MonitorOptions {
                    inactivity_timeout: Duration::from_secs(record.inactivity_timeout_seconds),
                    done_pattern: if record.check_done_continuous {
                        done_pattern.as_ref()
                    } else {
                        None
                    },
                    baseline_lines,
                },
            )
            .await?;

            // The record may have been paused or killed while we watched.
            let current = self
                .ralphs()
                .load(name)?
                .ok_or_else(|| EngineError::Ralph(format!("loop state for {} vanished", name)))?;
            match current.status {
                RalphStatus::Running => {}
                RalphStatus::Paused => {
                    let record = self
                        .ralphs()
                        .update(name, |r| r.end_iteration(Utc::now()))?;
                    self.ralphs().append_iteration_log(
                        name,
                        LoopEvent::Pause,
                        "paused; agent left as-is",
                    )?;
                    return Ok(record);
                }
                RalphStatus::Stopped | RalphStatus::Failed => {
                    self.ralphs().append_iteration_log(
                        name,
                        LoopEvent::End,
                        "loop stopped externally",
                    )?;
                    return Ok(current);
                }
            }

            let done_hit_at_exit = done_pattern
                .as_ref()
                .map(|p| matches_after_baseline(&outcome.last_capture, p, baseline_lines))
                .unwrap_or(false);

            match outcome.event {
                MonitorEvent::DonePatternMatched => {
                    let record = self.ralphs().update(name, |r| {
                        r.end_iteration(Utc::now());
                        r.record_success();
                        r.finish(ExitReason::DonePattern);
                    })?;
                    self.ralphs().append_iteration_log(
                        name,
                        LoopEvent::Done,
                        "done pattern matched",
                    )?;
                    return Ok(record);
                }
                MonitorEvent::Inactive => {
                    if done_hit_at_exit {
                        let record = self.ralphs().update(name, |r| {
                            r.end_iteration(Utc::now());
                            r.record_success();
                            r.finish(ExitReason::DonePattern);
                        })?;
                        self.ralphs().append_iteration_log(
                            name,
                            LoopEvent::Done,
                            "done pattern matched",
                        )?;
                        return Ok(record);
                    }
                    self.ralphs()
                        .update(name, |r| r.end_iteration(Utc::now()))?;
                    let _ = mux.kill_window(&info.session, &info.window).await;
                    self.ralphs().append_iteration_log(
                        name,
                        LoopEvent::End,
                        &format!(
                            "inactive for {}s, restarting",
                            record.inactivity_timeout_seconds
                        ),
                    )?;
                }
                MonitorEvent::WorkerExited { exit_code } => {
                    if done_hit_at_exit {
                        let record = self.ralphs().update(name, |r| {
                            r.end_iteration(Utc::now());
                            r.record_success();
                            r.finish(ExitReason::DonePattern);
                        })?;
                        self.ralphs().append_iteration_log(
                            name,
                            LoopEvent::Done,
                            "done pattern matched",
                        )?;
                        return Ok(record);
                    }
                    // A vanished window leaves no status; treat as clean.
                    let code = exit_code.unwrap_or(0);
                    let _ = mux.kill_window(&info.session, &info.window).await;
                    if code == 0 {
                        self.ralphs().update(name, |r| {
                            r.end_iteration(Utc::now());
                            r.record_success();
                        })?;
                        self.ralphs().append_iteration_log(
                            name,
                            LoopEvent::End,
                            "agent exited cleanly",
                        )?;
                    } else {
                        let record = self.ralphs().update(name, |r| {
                            r.end_iteration(Utc::now());
                            r.record_failure();
                        })?;
                        self.ralphs().append_iteration_log(
                            name,
                            LoopEvent::Fail,
                            &format!("agent exit code {}", code),
                        )?;
                        if record.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                            let record = self
                                .ralphs()
                                .update(name, |r| r.finish(ExitReason::Failed))?;
                            self.ralphs().append_iteration_log(
                                name,
                                LoopEvent::Fail,
                                &format!(
                                    "{} consecutive failures, giving up",
                                    record.consecutive_failures
                                ),
                            )?;
                            return Ok(record);
                        }
                        let backoff = failure_backoff_secs(record.consecutive_failures);
                        tracing::warn!(
                            name,
                            consecutive_failures = record.consecutive_failures,
                            backoff_secs = backoff,
                            "agent failed; backing off"
                        );
                        tokio::time::sleep(Duration::from_secs(backoff)).await;
                    }
                }
            }
        }
    }

    /// Make sure a live agent pane exists before injecting: recreate the
    /// window in place when it is gone or its pane is dead. Returns an
    /// abort result when a blocking setup screen stops the first
    /// iteration.
    #[allow(clippy::type_complexity)]
    async fn ensure_agent_window(
        &self,
        name: &str,
        worker: &WorkerRecord,
        info: &MuxInfo,
        record: &RalphRecord,
    ) -> Result<Option<Result<RalphRecord, EngineError>>, EngineError> {
        let mux = self.mux_for(worker);
        let window_alive = mux.window_exists(&info.session, &info.window).await?
            && mux
                .pane_exit_code(&info.session, &info.window)
                .await
                .unwrap_or(None)
                .is_none();
        if window_alive {
            return Ok(None);
        }

        let _ = mux.kill_window(&info.session, &info.window).await;
        mux.ensure_session(&info.session).await?;
        let shell_line = window_command(&worker.command, &worker.env);
        mux.create_window(&info.session, &info.window, &worker.cwd, &shell_line)
            .await?;
        mux.set_remain_on_exit(&info.session, &info.window, true)
            .await?;

        match await_ready(&mux, &info.session, &info.window, DEFAULT_READY_TIMEOUT).await? {
            Readiness::Ready { .. } => Ok(None),
            Readiness::Blocked { pattern } => {
                // Only fatal before the first iteration; later on the
                // screen is agent output, not a setup flow.
                if record.current_iteration == 0 {
                    Ok(Some(self.abort_blocked(name, &pattern).await))
                } else {
                    tracing::warn!(name, pattern, "blocking pattern seen mid-loop; continuing");
                    Ok(None)
                }
            }
            Readiness::TimedOut { .. } => {
                tracing::warn!(name, "agent not ready before timeout; injecting anyway");
                Ok(None)
            }
        }
    }
}

fn compile_done_pattern(pattern: Option<&str>) -> Result<Option<Regex>, EngineError> {
    pattern
        .map(|p| {
            Regex::new(p)
                .map_err(|e| EngineError::Validation(format!("invalid done pattern {:?}: {}", p, e)))
        })
        .transpose()
}

#[cfg(test)]
#[path = "ralph_tests.rs"]
mod tests;
