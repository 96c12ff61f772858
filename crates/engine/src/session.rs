// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session naming and shell-line construction for mux windows.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Deterministic per-state-root session name: every worker of one project
/// lands in the same shared session, as sibling windows.
pub fn default_session_name(state_root: &Path) -> String {
    let absolute = state_root
        .canonicalize()
        .unwrap_or_else(|_| state_root.to_path_buf());
    let digest = Sha256::digest(absolute.to_string_lossy().as_bytes());
    format!("swarm-{:02x}{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2], digest[3])
}

/// Quote one word for a POSIX shell line.
fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if safe {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Build the shell line a mux window runs. The env shim (`env K=V ...`)
/// leads the command so worker env wins over whatever the multiplexer
/// server inherited at its own start.
pub fn window_command(command: &[String], env: &BTreeMap<String, String>) -> String {
    let mut words: Vec<String> = Vec::new();
    if !env.is_empty() {
        words.push("env".to_string());
        for (key, value) in env {
            words.push(shell_quote(&format!("{}={}", key, value)));
        }
    }
    words.extend(command.iter().map(|w| shell_quote(w)));
    words.join(" ")
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
