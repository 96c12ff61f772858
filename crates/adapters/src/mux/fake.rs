// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake multiplexer adapter for testing

use super::{ControlKey, MuxAdapter, MuxError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded multiplexer call
#[derive(Debug, Clone, PartialEq)]
pub enum MuxCall {
    EnsureSession {
        session: String,
    },
    CreateWindow {
        session: String,
        window: String,
        cwd: PathBuf,
        command: String,
    },
    SendText {
        session: String,
        window: String,
        text: String,
    },
    SendKey {
        session: String,
        window: String,
        key: ControlKey,
    },
    CapturePane {
        session: String,
        window: String,
    },
    SetRemainOnExit {
        session: String,
        window: String,
        on: bool,
    },
    KillWindow {
        session: String,
        window: String,
    },
    KillSession {
        session: String,
    },
}

#[derive(Debug, Clone, Default)]
struct FakeWindow {
    command: String,
    cwd: PathBuf,
    /// Scripted captures, consumed one per poll; the last one repeats.
    captures: VecDeque<String>,
    exit_code: Option<i32>,
    captures_served: usize,
    /// Pane dies with this code once that many captures were served.
    exit_after_captures: Option<(usize, i32)>,
}

/// Script for a window that a later `create_window` call will produce.
#[derive(Debug, Clone, Default)]
pub struct WindowScript {
    pub captures: Vec<String>,
    pub exit_after_captures: Option<(usize, i32)>,
}

#[derive(Default)]
struct FakeMuxState {
    sessions: HashSet<String>,
    windows: HashMap<(String, String), FakeWindow>,
    /// Applied FIFO to windows as they are created.
    window_scripts: VecDeque<WindowScript>,
    calls: Vec<MuxCall>,
    unavailable: bool,
    fail_create_window: Option<String>,
}

/// Fake multiplexer adapter for testing
#[derive(Clone, Default)]
pub struct FakeMux {
    inner: Arc<Mutex<FakeMuxState>>,
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MuxCall> {
        self.inner.lock().calls.clone()
    }

    /// All operations fail with `Unavailable`, as if tmux were missing.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }

    /// Make the next `create_window` fail with the given message.
    pub fn fail_next_create_window(&self, message: &str) {
        self.inner.lock().fail_create_window = Some(message.to_string());
    }

    /// Queue a script for the next window `create_window` produces.
    /// Scripts apply in FIFO order, one per created window.
    pub fn script_window(&self, captures: Vec<&str>, exit_after_captures: Option<(usize, i32)>) {
        self.inner.lock().window_scripts.push_back(WindowScript {
            captures: captures.into_iter().map(String::from).collect(),
            exit_after_captures,
        });
    }

    /// Script the sequence of pane captures returned for a window. The
    /// final entry repeats once the queue drains.
    pub fn set_captures(&self, session: &str, window: &str, captures: Vec<&str>) {
        if let Some(w) = self
            .inner
            .lock()
            .windows
            .get_mut(&(session.to_string(), window.to_string()))
        {
            w.captures = captures.into_iter().map(String::from).collect();
        }
    }

    /// Mark the window's pane as dead with the given exit status.
    pub fn set_exited(&self, session: &str, window: &str, exit_code: i32) {
        if let Some(w) = self
            .inner
            .lock()
            .windows
            .get_mut(&(session.to_string(), window.to_string()))
        {
            w.exit_code = Some(exit_code);
        }
    }

    /// Drop the window entirely, as if the pane closed.
    pub fn remove_window(&self, session: &str, window: &str) {
        self.inner
            .lock()
            .windows
            .remove(&(session.to_string(), window.to_string()));
    }

    /// Pre-create a session and window (for tests that start mid-life).
    pub fn add_window(&self, session: &str, window: &str, captures: Vec<&str>) {
        let mut inner = self.inner.lock();
        inner.sessions.insert(session.to_string());
        inner.windows.insert(
            (session.to_string(), window.to_string()),
            FakeWindow {
                captures: captures.into_iter().map(String::from).collect(),
                ..FakeWindow::default()
            },
        );
    }

    pub fn window_command(&self, session: &str, window: &str) -> Option<String> {
        self.inner
            .lock()
            .windows
            .get(&(session.to_string(), window.to_string()))
            .map(|w| w.command.clone())
    }

    pub fn has_window(&self, session: &str, window: &str) -> bool {
        self.inner
            .lock()
            .windows
            .contains_key(&(session.to_string(), window.to_string()))
    }

    pub fn has_session(&self, session: &str) -> bool {
        self.inner.lock().sessions.contains(session)
    }

    /// Text sent to a window via the literal send path, in order.
    pub fn sent_text(&self, session: &str, window: &str) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MuxCall::SendText {
                    session: s,
                    window: w,
                    text,
                } if s == session && w == window => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_available(state: &FakeMuxState) -> Result<(), MuxError> {
        if state.unavailable {
            return Err(MuxError::Unavailable("fake mux unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MuxAdapter for FakeMux {
    /// All sockets resolve to the one fake server, so tests can observe
    /// every call regardless of socket routing.
    fn for_socket(&self, _socket: Option<&str>) -> Self {
        self.clone()
    }

    async fn ensure_session(&self, session: &str) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::EnsureSession {
            session: session.to_string(),
        });
        inner.sessions.insert(session.to_string());
        Ok(())
    }

    async fn session_exists(&self, session: &str) -> Result<bool, MuxError> {
        let inner = self.inner.lock();
        Self::check_available(&inner)?;
        Ok(inner.sessions.contains(session))
    }

    async fn create_window(
        &self,
        session: &str,
        window: &str,
        cwd: &Path,
        command: &str,
    ) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::CreateWindow {
            session: session.to_string(),
            window: window.to_string(),
            cwd: cwd.to_path_buf(),
            command: command.to_string(),
        });
        if let Some(message) = inner.fail_create_window.take() {
            return Err(MuxError::Unavailable(message));
        }
        if !inner.sessions.contains(session) {
            return Err(MuxError::TargetMissing(format!(
                "no session {}",
                session
            )));
        }
        let script = inner.window_scripts.pop_front().unwrap_or_default();
        inner.windows.insert(
            (session.to_string(), window.to_string()),
            FakeWindow {
                command: command.to_string(),
                cwd: cwd.to_path_buf(),
                captures: script.captures.into(),
                exit_after_captures: script.exit_after_captures,
                ..FakeWindow::default()
            },
        );
        Ok(())
    }

    async fn window_exists(&self, session: &str, window: &str) -> Result<bool, MuxError> {
        let inner = self.inner.lock();
        Self::check_available(&inner)?;
        Ok(inner
            .windows
            .contains_key(&(session.to_string(), window.to_string())))
    }

    async fn send_text(&self, session: &str, window: &str, text: &str) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::SendText {
            session: session.to_string(),
            window: window.to_string(),
            text: text.to_string(),
        });
        if !inner
            .windows
            .contains_key(&(session.to_string(), window.to_string()))
        {
            return Err(MuxError::TargetMissing(format!(
                "no window {}:{}",
                session, window
            )));
        }
        Ok(())
    }

    async fn send_key(
        &self,
        session: &str,
        window: &str,
        key: ControlKey,
    ) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::SendKey {
            session: session.to_string(),
            window: window.to_string(),
            key,
        });
        if !inner
            .windows
            .contains_key(&(session.to_string(), window.to_string()))
        {
            return Err(MuxError::TargetMissing(format!(
                "no window {}:{}",
                session, window
            )));
        }
        Ok(())
    }

    async fn capture_pane(
        &self,
        session: &str,
        window: &str,
        _history_lines: u32,
    ) -> Result<String, MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::CapturePane {
            session: session.to_string(),
            window: window.to_string(),
        });
        let Some(w) = inner
            .windows
            .get_mut(&(session.to_string(), window.to_string()))
        else {
            return Err(MuxError::TargetMissing(format!(
                "no window {}:{}",
                session, window
            )));
        };
        w.captures_served += 1;
        if let Some((after, code)) = w.exit_after_captures {
            if w.captures_served >= after {
                w.exit_code = Some(code);
            }
        }
        match w.captures.len() {
            0 => Ok(String::new()),
            1 => Ok(w.captures[0].clone()),
            _ => Ok(w.captures.pop_front().unwrap_or_default()),
        }
    }

    async fn set_remain_on_exit(
        &self,
        session: &str,
        window: &str,
        on: bool,
    ) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::SetRemainOnExit {
            session: session.to_string(),
            window: window.to_string(),
            on,
        });
        Ok(())
    }

    async fn pane_exit_code(
        &self,
        session: &str,
        window: &str,
    ) -> Result<Option<i32>, MuxError> {
        let inner = self.inner.lock();
        Self::check_available(&inner)?;
        match inner
            .windows
            .get(&(session.to_string(), window.to_string()))
        {
            Some(w) => Ok(w.exit_code),
            None => Err(MuxError::TargetMissing(format!(
                "no window {}:{}",
                session, window
            ))),
        }
    }

    async fn kill_window(&self, session: &str, window: &str) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::KillWindow {
            session: session.to_string(),
            window: window.to_string(),
        });
        inner
            .windows
            .remove(&(session.to_string(), window.to_string()));
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), MuxError> {
        let mut inner = self.inner.lock();
        Self::check_available(&inner)?;
        inner.calls.push(MuxCall::KillSession {
            session: session.to_string(),
        });
        inner.sessions.remove(session);
        inner.windows.retain(|(s, _), _| s != session);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
