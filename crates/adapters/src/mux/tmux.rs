// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux multiplexer adapter

use super::{ControlKey, MuxAdapter, MuxError};
use crate::subprocess::{run_with_timeout, MUX_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Tmux-based multiplexer adapter. An explicit socket path selects a
/// separate tmux server; the default server is used otherwise.
#[derive(Debug, Clone, Default)]
pub struct TmuxMux {
    socket: Option<String>,
}

impl TmuxMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_socket(socket: Option<String>) -> Self {
        TmuxMux { socket }
    }

    pub fn socket(&self) -> Option<&str> {
        self.socket.as_deref()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket {
            cmd.arg("-S").arg(socket);
        }
        cmd
    }

    async fn run(&self, args: &[&str], description: &str) -> Result<Output, MuxError> {
        let mut cmd = self.command();
        cmd.args(args);
        run_with_timeout(cmd, MUX_TIMEOUT, description)
            .await
            .map_err(MuxError::Unavailable)
    }

    fn target(session: &str, window: &str) -> String {
        format!("{}:{}", session, window)
    }
}

fn target_missing(output: &Output, what: &str) -> MuxError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    MuxError::TargetMissing(format!("{}: {}", what, stderr.trim()))
}

#[async_trait]
impl MuxAdapter for TmuxMux {
    fn for_socket(&self, socket: Option<&str>) -> Self {
        TmuxMux {
            socket: socket.map(String::from),
        }
    }

    async fn ensure_session(&self, session: &str) -> Result<(), MuxError> {
        if self.session_exists(session).await? {
            return Ok(());
        }
        let output = self
            .run(&["new-session", "-d", "-s", session], "tmux new-session")
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Lost the race against a sibling spawn; the session is there.
            if self.session_exists(session).await? {
                return Ok(());
            }
            return Err(MuxError::Unavailable(format!(
                "tmux new-session failed: {}",
                stderr.trim()
            )));
        }
        tracing::debug!(session, socket = ?self.socket, "created mux session");
        Ok(())
    }

    async fn session_exists(&self, session: &str) -> Result<bool, MuxError> {
        let output = self
            .run(
                &["has-session", "-t", &format!("={}", session)],
                "tmux has-session",
            )
            .await?;
        Ok(output.status.success())
    }

    async fn create_window(
        &self,
        session: &str,
        window: &str,
        cwd: &Path,
        command: &str,
    ) -> Result<(), MuxError> {
        if !cwd.is_dir() {
            return Err(MuxError::Unavailable(format!(
                "working directory does not exist: {}",
                cwd.display()
            )));
        }
        let cwd_str = cwd.display().to_string();
        let target = format!("={}:", session);
        let output = self
            .run(
                &[
                    "new-window", "-d", "-t", &target, "-n", window, "-c", &cwd_str, command,
                ],
                "tmux new-window",
            )
            .await?;
        if !output.status.success() {
            return Err(target_missing(&output, "new-window"));
        }
        tracing::debug!(session, window, command, "created mux window");
        Ok(())
    }

    async fn window_exists(&self, session: &str, window: &str) -> Result<bool, MuxError> {
        let target = format!("={}", session);
        let output = self
            .run(
                &["list-windows", "-t", &target, "-F", "#{window_name}"],
                "tmux list-windows",
            )
            .await?;
        if !output.status.success() {
            // Session gone means the window is gone too.
            return Ok(false);
        }
        let names = String::from_utf8_lossy(&output.stdout);
        Ok(names.lines().any(|name| name == window))
    }

    async fn send_text(&self, session: &str, window: &str, text: &str) -> Result<(), MuxError> {
        let target = Self::target(session, window);
        // -l = literal mode (no key name interpretation)
        // -- = end of options (handles text starting with -)
        let output = self
            .run(
                &["send-keys", "-t", &target, "-l", "--", text],
                "tmux send-keys",
            )
            .await?;
        if !output.status.success() {
            return Err(target_missing(&output, "send-keys"));
        }
        Ok(())
    }

    async fn send_key(
        &self,
        session: &str,
        window: &str,
        key: ControlKey,
    ) -> Result<(), MuxError> {
        let target = Self::target(session, window);
        let output = self
            .run(
                &["send-keys", "-t", &target, key.key_name()],
                "tmux send-keys",
            )
            .await?;
        if !output.status.success() {
            return Err(target_missing(&output, "send-keys"));
        }
        Ok(())
    }

    async fn capture_pane(
        &self,
        session: &str,
        window: &str,
        history_lines: u32,
    ) -> Result<String, MuxError> {
        let target = Self::target(session, window);
        let start = format!("-{}", history_lines);
        let output = self
            .run(
                &["capture-pane", "-p", "-t", &target, "-S", &start],
                "tmux capture-pane",
            )
            .await?;
        if !output.status.success() {
            return Err(target_missing(&output, "capture-pane"));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn set_remain_on_exit(
        &self,
        session: &str,
        window: &str,
        on: bool,
    ) -> Result<(), MuxError> {
        let target = Self::target(session, window);
        let value = if on { "on" } else { "off" };
        let output = self
            .run(
                &["set-option", "-w", "-t", &target, "remain-on-exit", value],
                "tmux set-option",
            )
            .await?;
        if !output.status.success() {
            return Err(target_missing(&output, "set-option"));
        }
        Ok(())
    }

    async fn pane_exit_code(
        &self,
        session: &str,
        window: &str,
    ) -> Result<Option<i32>, MuxError> {
        let target = Self::target(session, window);
        let output = self
            .run(
                &[
                    "display-message",
                    "-p",
                    "-t",
                    &target,
                    "#{pane_dead} #{pane_dead_status}",
                ],
                "tmux display-message",
            )
            .await?;
        if !output.status.success() {
            return Err(target_missing(&output, "display-message"));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let mut parts = text.trim().split(' ');
        let dead = parts.next() == Some("1");
        if !dead {
            return Ok(None);
        }
        // pane_dead_status is empty when the pane died without a status.
        Ok(Some(
            parts.next().and_then(|s| s.parse().ok()).unwrap_or(0),
        ))
    }

    async fn kill_window(&self, session: &str, window: &str) -> Result<(), MuxError> {
        let target = Self::target(session, window);
        let output = self
            .run(&["kill-window", "-t", &target], "tmux kill-window")
            .await?;
        if !output.status.success() {
            // Window might already be dead, which is fine
        }
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), MuxError> {
        let target = format!("={}", session);
        let output = self
            .run(&["kill-session", "-t", &target], "tmux kill-session")
            .await?;
        if !output.status.success() {
            // Session might already be dead, which is fine
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
