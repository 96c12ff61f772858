// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal-multiplexer adapters.
//!
//! Workers share one multiplexer server (or an explicit per-socket server)
//! and are addressed as `(session, window)` pairs; the window name is the
//! worker name.

mod tmux;

pub use tmux::TmuxMux;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMux, MuxCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from multiplexer operations. These are never silent no-ops:
/// a missing binary or dead server is `Unavailable`, a vanished session
/// or window is `TargetMissing`.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("terminal multiplexer unavailable: {0}")]
    Unavailable(String),
    #[error("multiplexer target missing: {0}")]
    TargetMissing(String),
}

/// Named keys sent through the control variant of send-keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Enter,
    Escape,
    CtrlC,
    CtrlD,
    CtrlU,
}

impl ControlKey {
    pub fn key_name(self) -> &'static str {
        match self {
            ControlKey::Enter => "Enter",
            ControlKey::Escape => "Escape",
            ControlKey::CtrlC => "C-c",
            ControlKey::CtrlD => "C-d",
            ControlKey::CtrlU => "C-u",
        }
    }
}

/// Adapter over the terminal multiplexer.
#[async_trait]
pub trait MuxAdapter: Clone + Send + Sync + 'static {
    /// An adapter addressing the server behind `socket` (`None` selects
    /// the default server).
    fn for_socket(&self, socket: Option<&str>) -> Self;

    /// Create the session (detached) if it does not already exist.
    async fn ensure_session(&self, session: &str) -> Result<(), MuxError>;

    async fn session_exists(&self, session: &str) -> Result<bool, MuxError>;

    /// Create a named window in an existing session, running `command`
    /// (a shell line) with the given working directory.
    async fn create_window(
        &self,
        session: &str,
        window: &str,
        cwd: &Path,
        command: &str,
    ) -> Result<(), MuxError>;

    async fn window_exists(&self, session: &str, window: &str) -> Result<bool, MuxError>;

    /// Send literal text: no key-name interpretation.
    async fn send_text(&self, session: &str, window: &str, text: &str) -> Result<(), MuxError>;

    /// Send a named control key.
    async fn send_key(&self, session: &str, window: &str, key: ControlKey)
        -> Result<(), MuxError>;

    /// Capture the visible pane plus `history_lines` of scrollback as one
    /// string. ANSI escapes are left intact; readiness detection depends
    /// on them.
    async fn capture_pane(
        &self,
        session: &str,
        window: &str,
        history_lines: u32,
    ) -> Result<String, MuxError>;

    /// Keep the pane around after its process exits so the exit status
    /// stays observable.
    async fn set_remain_on_exit(
        &self,
        session: &str,
        window: &str,
        on: bool,
    ) -> Result<(), MuxError>;

    /// Exit status of the pane's process: `None` while it is running,
    /// `Some(code)` once the pane is dead.
    async fn pane_exit_code(&self, session: &str, window: &str)
        -> Result<Option<i32>, MuxError>;

    /// Kill a window. Succeeds if the window is already gone.
    async fn kill_window(&self, session: &str, window: &str) -> Result<(), MuxError>;

    /// Kill a session. Succeeds if the session is already gone.
    async fn kill_session(&self, session: &str) -> Result<(), MuxError>;
}
