// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git worktree adapter

use super::{WorktreeAdapter, WorktreeError};
use crate::subprocess::{run_with_timeout, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

#[derive(Debug, Clone, Default)]
pub struct GitWorktree;

impl GitWorktree {
    pub fn new() -> Self {
        Self
    }

    async fn git(repo: &Path, args: &[&str], description: &str) -> Result<Output, WorktreeError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo).args(args);
        run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, description)
            .await
            .map_err(WorktreeError::CommandFailed)
    }

    async fn is_repository(base_repo: &Path) -> Result<bool, WorktreeError> {
        if !base_repo.is_dir() {
            return Ok(false);
        }
        let output = Self::git(base_repo, &["rev-parse", "--git-dir"], "git rev-parse").await?;
        Ok(output.status.success())
    }

    async fn branch_exists(base_repo: &Path, branch: &str) -> Result<bool, WorktreeError> {
        let reference = format!("refs/heads/{}", branch);
        let output = Self::git(
            base_repo,
            &["show-ref", "--verify", "--quiet", &reference],
            "git show-ref",
        )
        .await?;
        Ok(output.status.success())
    }
}

#[async_trait]
impl WorktreeAdapter for GitWorktree {
    async fn create(
        &self,
        path: &Path,
        branch: &str,
        base_repo: &Path,
    ) -> Result<(), WorktreeError> {
        if !Self::is_repository(base_repo).await? {
            return Err(WorktreeError::NotARepository(base_repo.to_path_buf()));
        }
        if path.exists() {
            // Reuse an existing worktree already on the requested branch.
            let head = Self::git(path, &["rev-parse", "--abbrev-ref", "HEAD"], "git rev-parse")
                .await?;
            if head.status.success() && String::from_utf8_lossy(&head.stdout).trim() == branch {
                return Ok(());
            }
            return Err(WorktreeError::CommandFailed(format!(
                "{} exists and is not a worktree on branch {}",
                path.display(),
                branch
            )));
        }
        let path_str = path.display().to_string();
        let output = if Self::branch_exists(base_repo, branch).await? {
            Self::git(
                base_repo,
                &["worktree", "add", &path_str, branch],
                "git worktree add",
            )
            .await?
        } else {
            Self::git(
                base_repo,
                &["worktree", "add", "-b", branch, &path_str],
                "git worktree add -b",
            )
            .await?
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorktreeError::CommandFailed(format!(
                "worktree add {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        tracing::debug!(path = %path.display(), branch, "created worktree");
        Ok(())
    }

    async fn change_count(&self, path: &Path) -> Result<usize, WorktreeError> {
        let output = Self::git(path, &["status", "--porcelain"], "git status").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorktreeError::CommandFailed(format!(
                "status {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().filter(|l| !l.trim().is_empty()).count())
    }

    async fn remove(&self, path: &Path, force: bool) -> Result<(), WorktreeError> {
        if !path.exists() {
            return Ok(());
        }
        if !force {
            let changes = self.change_count(path).await.unwrap_or(1);
            if changes > 0 {
                return Err(WorktreeError::Dirty {
                    path: path.to_path_buf(),
                    changes,
                });
            }
        }
        let path_str = path.display().to_string();
        // Run from inside the worktree so git can find the owning repo.
        let output = Self::git(
            path,
            &["worktree", "remove", "--force", &path_str],
            "git worktree remove",
        )
        .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorktreeError::CommandFailed(format!(
                "worktree remove {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        tracing::debug!(path = %path.display(), "removed worktree");
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
