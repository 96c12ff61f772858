// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bare-process workers: detached spawn, liveness probe, graceful kill.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// How often the kill path re-probes a terminating process.
pub const KILL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a process gets to exit after SIGTERM before SIGKILL.
pub const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Spawn `command` detached in its own process group, with stdout and
/// stderr redirected to log files. Returns the child's PID; the child is
/// not waited on.
pub fn spawn_detached(
    command: &[String],
    cwd: &Path,
    env: &BTreeMap<String, String>,
    stdout_log: &Path,
    stderr_log: &Path,
) -> Result<u32, ProcessError> {
    let open_log = |path: &Path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ProcessError::LogFile {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ProcessError::LogFile {
                path: path.to_path_buf(),
                source,
            })
    };
    let stdout = open_log(stdout_log)?;
    let stderr = open_log(stderr_log)?;

    let (program, args) = command.split_first().ok_or_else(|| ProcessError::Spawn {
        command: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
    })?;

    let mut cmd = std::process::Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .envs(env)
        .stdin(std::process::Stdio::null())
        .stdout(stdout)
        .stderr(stderr);

    // Own process group: the worker survives the short-lived CLI and is
    // not reaped with the caller's terminal.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        command: command.join(" "),
        source,
    })?;
    let pid = child.id();
    tracing::debug!(pid, command = %command.join(" "), "spawned detached process");
    // Intentionally not waited on; the OS reparents it on our exit.
    drop(child);
    Ok(pid)
}

/// Signal-0 probe: true iff the PID exists (or we lack permission to
/// signal it, which still means it is alive).
pub fn is_alive(pid: u32) -> bool {
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Graceful-then-forceful termination: SIGTERM, poll every 100 ms for up
/// to `grace`, SIGKILL if still alive. "No such process" is ignored
/// throughout.
pub async fn terminate(pid: u32, grace: Duration) {
    let target = Pid::from_raw(pid as i32);
    match kill(target, Signal::SIGTERM) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => tracing::warn!(pid, error = %e, "SIGTERM failed"),
    }

    let deadline = tokio::time::Instant::now() + grace;
    while is_alive(pid) {
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(pid, "process survived grace period, sending SIGKILL");
            match kill(target, Signal::SIGKILL) {
                Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => tracing::warn!(pid, error = %e, "SIGKILL failed"),
            }
            return;
        }
        tokio::time::sleep(KILL_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
