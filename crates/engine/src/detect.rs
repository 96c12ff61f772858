// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness and inactivity detection over captured pane buffers.
//!
//! Readiness patterns run against the raw capture: several anchors depend
//! on the ANSI SGR escape itself being a line prefix, so input is never
//! stripped there. Inactivity hashing is the opposite: the tail is
//! ANSI-normalized first so a spinner repainting colors does not count as
//! activity.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use std::time::Duration;
use swarm_adapters::{MuxAdapter, MuxError};

pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(120);
pub const INACTIVITY_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const INACTIVITY_TAIL_LINES: usize = 20;
/// Scrollback depth for monitoring captures.
pub const CAPTURE_HISTORY_LINES: u32 = 200;

/// Ready indicators: any match means the agent is accepting input.
static READY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Agent permission-mode hints
        r"(?i)bypass permissions",
        r"(?i)permissions mode",
        r"(?i)shift\+tab to cycle",
        // Version banners
        r"Claude Code v\d+\.\d+",
        r"(?i)opencode\s+v?\d+\.\d+",
        // Prompt characters, anchored to line start or an SGR prefix
        r"^(?:\x1b\[[0-9;]*m)*> ",
        r"^(?:\x1b\[[0-9;]*m)*\u{276F}",
        r"^(?:\x1b\[[0-9;]*m)*\$ ",
        r"^>>> ",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| unreachable!("bad ready pattern {p}: {e}")))
    .collect()
});

/// Blocking states: the agent is on screen but needs interactive setup.
/// These never count as ready.
static BLOCKING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // First-run theme picker
        r"Choose the text style",
        r"looks best with your terminal",
        // Login flow
        r"Select login method",
        r"Paste code here",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| unreachable!("bad blocking pattern {p}: {e}")))
    .collect()
});

static ANSI_ESCAPES: LazyLock<Regex> = LazyLock::new(|| {
    // CSI sequences, OSC sequences, then any other lone escape.
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b.")
        .unwrap_or_else(|e| unreachable!("bad ansi pattern: {e}"))
});

/// What a single capture says about agent readiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    Ready { pattern: String },
    Blocked { pattern: String },
}

/// Scan one capture. Blocking states win over ready indicators: a theme
/// picker also renders a selection caret that would otherwise match.
pub fn scan_readiness(capture: &str) -> Option<ReadyState> {
    for pattern in BLOCKING_PATTERNS.iter() {
        if pattern.is_match(capture) {
            return Some(ReadyState::Blocked {
                pattern: pattern.as_str().to_string(),
            });
        }
    }
    for line in capture.lines() {
        for pattern in READY_PATTERNS.iter() {
            if pattern.is_match(line) {
                return Some(ReadyState::Ready {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
    }
    None
}

/// Outcome of waiting for readiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready { pattern: String },
    Blocked { pattern: String },
    TimedOut { last_capture: String },
}

/// Poll the pane every 500 ms until a ready pattern appears, a blocking
/// state is seen, or `timeout` elapses. A missing window is retried (the
/// window may still be initializing); other mux failures propagate.
pub async fn await_ready<M: MuxAdapter>(
    mux: &M,
    session: &str,
    window: &str,
    timeout: Duration,
) -> Result<Readiness, MuxError> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut last_capture = String::new();
    loop {
        match mux.capture_pane(session, window, 0).await {
            Ok(capture) => {
                match scan_readiness(&capture) {
                    Some(ReadyState::Ready { pattern }) => {
                        return Ok(Readiness::Ready { pattern });
                    }
                    Some(ReadyState::Blocked { pattern }) => {
                        return Ok(Readiness::Blocked { pattern });
                    }
                    None => {}
                }
                last_capture = capture;
            }
            Err(MuxError::TargetMissing(_)) => {}
            Err(e) => return Err(e),
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(Readiness::TimedOut { last_capture });
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

/// Strip ANSI escapes and keep the last `INACTIVITY_TAIL_LINES` lines.
pub fn normalize_tail(capture: &str) -> String {
    let stripped = ANSI_ESCAPES.replace_all(capture, "");
    let lines: Vec<&str> = stripped.lines().collect();
    let start = lines.len().saturating_sub(INACTIVITY_TAIL_LINES);
    lines[start..].join("\n")
}

fn screen_hash(capture: &str) -> [u8; 32] {
    Sha256::digest(normalize_tail(capture).as_bytes()).into()
}

/// Line count of the baseline snapshot; done-pattern scans skip this many
/// leading lines of later captures so the injected prompt cannot match
/// itself.
pub fn baseline_line_count(baseline: &str) -> usize {
    baseline.lines().count()
}

/// Match `pattern` only against capture lines past the baseline.
pub fn matches_after_baseline(capture: &str, pattern: &Regex, baseline_lines: usize) -> bool {
    capture
        .lines()
        .skip(baseline_lines)
        .any(|line| pattern.is_match(line))
}

/// Why the monitoring loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Screen hash unchanged for the inactivity timeout.
    Inactive,
    /// The pane process exited (code known via remain-on-exit) or the
    /// window disappeared entirely (code unknown).
    WorkerExited { exit_code: Option<i32> },
    /// `check_done_continuous` saw the done pattern past the baseline.
    DonePatternMatched,
}

/// Monitoring result plus the final capture, for end-of-iteration checks.
#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub event: MonitorEvent,
    pub last_capture: String,
}

pub struct MonitorOptions<'a> {
    pub inactivity_timeout: Duration,
    /// Done pattern checked continuously when set.
    pub done_pattern: Option<&'a Regex>,
    pub baseline_lines: usize,
}

/// Poll the pane every 2 s until the worker exits, the screen goes quiet,
/// or the done pattern appears beyond the baseline.
pub async fn monitor_window<M: MuxAdapter>(
    mux: &M,
    session: &str,
    window: &str,
    opts: MonitorOptions<'_>,
) -> Result<MonitorOutcome, MuxError> {
    let mut last_hash: Option<[u8; 32]> = None;
    let mut last_change = tokio::time::Instant::now();
    let mut last_capture = String::new();

    loop {
        if !mux.window_exists(session, window).await? {
            return Ok(MonitorOutcome {
                event: MonitorEvent::WorkerExited { exit_code: None },
                last_capture,
            });
        }

        let capture = match mux
            .capture_pane(session, window, CAPTURE_HISTORY_LINES)
            .await
        {
            Ok(capture) => capture,
            // Window vanished between the probe and the capture.
            Err(MuxError::TargetMissing(_)) => {
                return Ok(MonitorOutcome {
                    event: MonitorEvent::WorkerExited { exit_code: None },
                    last_capture,
                });
            }
            Err(e) => return Err(e),
        };
        last_capture = capture;

        if let Some(pattern) = opts.done_pattern {
            if matches_after_baseline(&last_capture, pattern, opts.baseline_lines) {
                return Ok(MonitorOutcome {
                    event: MonitorEvent::DonePatternMatched,
                    last_capture,
                });
            }
        }

        if let Some(code) = mux.pane_exit_code(session, window).await.ok().flatten() {
            return Ok(MonitorOutcome {
                event: MonitorEvent::WorkerExited {
                    exit_code: Some(code),
                },
                last_capture,
            });
        }

        let hash = screen_hash(&last_capture);
        if last_hash != Some(hash) {
            last_hash = Some(hash);
            last_change = tokio::time::Instant::now();
        } else if last_change.elapsed() >= opts.inactivity_timeout {
            return Ok(MonitorOutcome {
                event: MonitorEvent::Inactive,
                last_capture,
            });
        }

        tokio::time::sleep(INACTIVITY_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
