// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared load/save plumbing for the JSON stores.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("worker already exists: {0}")]
    AlreadyExists(String),
    #[error("worker not found: {0}")]
    NotFound(String),
    #[error("serialization failed for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_err(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load a JSON value from `path`. A missing file yields `None`. A present
/// but malformed file is renamed to `<file>.corrupted` and also yields
/// `None`, with a warning; state is never silently destroyed, never fatal.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path, e)),
    };
    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let corrupted = corrupted_path(path);
            tracing::warn!(
                path = %path.display(),
                corrupted = %corrupted.display(),
                error = %e,
                "state file is malformed, moving aside and starting fresh"
            );
            std::fs::rename(path, &corrupted).map_err(|e| io_err(path, e))?;
            Ok(None)
        }
    }
}

/// Write a JSON value to `path` via a temp-file rename so readers never see
/// a partial file.
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

fn corrupted_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state.json".to_string());
    name.push_str(".corrupted");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
