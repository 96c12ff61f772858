// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git worktree adapters.

mod git;

pub use git::GitWorktree;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWorktree, WorktreeCall};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),
    #[error("worktree at {path} has {changes} uncommitted change(s)")]
    Dirty { path: PathBuf, changes: usize },
    #[error("git command failed: {0}")]
    CommandFailed(String),
}

/// Default worktree placement:
/// `<parent_of_base_repo>/<base_repo_name>-worktrees/<worker_name>/`.
pub fn default_worktree_path(base_repo: &Path, worker_name: &str) -> PathBuf {
    let repo_name = base_repo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string());
    let parent = base_repo.parent().unwrap_or(base_repo);
    parent
        .join(format!("{}-worktrees", repo_name))
        .join(worker_name)
}

/// Adapter over the version-control worktree machinery.
#[async_trait]
pub trait WorktreeAdapter: Clone + Send + Sync + 'static {
    /// Create a worktree at `path` on `branch`, creating the branch if
    /// absent and reusing it if present. Fails with `NotARepository` when
    /// `base_repo` is not a repository.
    async fn create(
        &self,
        path: &Path,
        branch: &str,
        base_repo: &Path,
    ) -> Result<(), WorktreeError>;

    /// Uncommitted change count: staged, unstaged, and untracked files
    /// not covered by ignore rules.
    async fn change_count(&self, path: &Path) -> Result<usize, WorktreeError>;

    /// True iff the worktree has uncommitted changes. Fail-safe: any
    /// adapter error reports dirty.
    async fn is_dirty(&self, path: &Path) -> bool {
        self.change_count(path).await.map_or(true, |n| n > 0)
    }

    /// Remove the worktree. Succeeds idempotently when `path` is absent;
    /// fails with `Dirty` when the tree has changes and `force` is off.
    async fn remove(&self, path: &Path, force: bool) -> Result<(), WorktreeError>;
}
