// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake worktree adapter for testing

use super::{WorktreeAdapter, WorktreeError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded worktree call
#[derive(Debug, Clone, PartialEq)]
pub enum WorktreeCall {
    Create {
        path: PathBuf,
        branch: String,
        base_repo: PathBuf,
    },
    Remove {
        path: PathBuf,
        force: bool,
    },
}

#[derive(Default)]
struct FakeWorktreeState {
    /// path -> branch for live worktrees
    worktrees: HashMap<PathBuf, String>,
    /// path -> uncommitted change count
    dirty: HashMap<PathBuf, usize>,
    not_repositories: HashSet<PathBuf>,
    calls: Vec<WorktreeCall>,
    fail_create: Option<String>,
}

/// Fake worktree adapter for testing
#[derive(Clone, Default)]
pub struct FakeWorktree {
    inner: Arc<Mutex<FakeWorktreeState>>,
}

impl FakeWorktree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WorktreeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.inner.lock().worktrees.contains_key(path)
    }

    pub fn branch(&self, path: &Path) -> Option<String> {
        self.inner.lock().worktrees.get(path).cloned()
    }

    pub fn set_dirty(&self, path: &Path, changes: usize) {
        self.inner.lock().dirty.insert(path.to_path_buf(), changes);
    }

    /// Treat `base_repo` as not-a-repository on create.
    pub fn set_not_a_repository(&self, base_repo: &Path) {
        self.inner
            .lock()
            .not_repositories
            .insert(base_repo.to_path_buf());
    }

    pub fn fail_next_create(&self, message: &str) {
        self.inner.lock().fail_create = Some(message.to_string());
    }
}

#[async_trait]
impl WorktreeAdapter for FakeWorktree {
    async fn create(
        &self,
        path: &Path,
        branch: &str,
        base_repo: &Path,
    ) -> Result<(), WorktreeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(WorktreeCall::Create {
            path: path.to_path_buf(),
            branch: branch.to_string(),
            base_repo: base_repo.to_path_buf(),
        });
        if inner.not_repositories.contains(base_repo) {
            return Err(WorktreeError::NotARepository(base_repo.to_path_buf()));
        }
        if let Some(message) = inner.fail_create.take() {
            return Err(WorktreeError::CommandFailed(message));
        }
        match inner.worktrees.get(path) {
            Some(existing) if existing == branch => Ok(()),
            Some(existing) => Err(WorktreeError::CommandFailed(format!(
                "{} exists on branch {}, wanted {}",
                path.display(),
                existing,
                branch
            ))),
            None => {
                inner
                    .worktrees
                    .insert(path.to_path_buf(), branch.to_string());
                Ok(())
            }
        }
    }

    async fn change_count(&self, path: &Path) -> Result<usize, WorktreeError> {
        let inner = self.inner.lock();
        if !inner.worktrees.contains_key(path) {
            return Err(WorktreeError::CommandFailed(format!(
                "no worktree at {}",
                path.display()
            )));
        }
        Ok(inner.dirty.get(path).copied().unwrap_or(0))
    }

    async fn remove(&self, path: &Path, force: bool) -> Result<(), WorktreeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(WorktreeCall::Remove {
            path: path.to_path_buf(),
            force,
        });
        if !inner.worktrees.contains_key(path) {
            return Ok(());
        }
        let changes = inner.dirty.get(path).copied().unwrap_or(0);
        if changes > 0 && !force {
            return Err(WorktreeError::Dirty {
                path: path.to_path_buf(),
                changes,
            });
        }
        inner.worktrees.remove(path);
        inner.dirty.remove(path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
