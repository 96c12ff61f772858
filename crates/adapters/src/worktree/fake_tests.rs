// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn create_then_remove_round_trips() {
    let adapter = FakeWorktree::new();
    let path = Path::new("/wt/a");
    adapter
        .create(path, "branch", Path::new("/repo"))
        .await
        .unwrap();
    assert!(adapter.exists(path));
    assert_eq!(adapter.branch(path).as_deref(), Some("branch"));

    adapter.remove(path, false).await.unwrap();
    assert!(!adapter.exists(path));
    // Idempotent once gone.
    adapter.remove(path, false).await.unwrap();
}

#[tokio::test]
async fn dirty_blocks_remove_until_forced() {
    let adapter = FakeWorktree::new();
    let path = Path::new("/wt/a");
    adapter
        .create(path, "branch", Path::new("/repo"))
        .await
        .unwrap();
    adapter.set_dirty(path, 3);

    assert!(adapter.is_dirty(path).await);
    let err = adapter.remove(path, false).await.unwrap_err();
    assert!(matches!(err, WorktreeError::Dirty { changes: 3, .. }));

    adapter.remove(path, true).await.unwrap();
    assert!(!adapter.exists(path));
}

#[tokio::test]
async fn not_a_repository_is_reported() {
    let adapter = FakeWorktree::new();
    adapter.set_not_a_repository(Path::new("/plain"));
    let err = adapter
        .create(Path::new("/wt/a"), "b", Path::new("/plain"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorktreeError::NotARepository(_)));
}

#[tokio::test]
async fn is_dirty_fails_safe_for_unknown_path() {
    let adapter = FakeWorktree::new();
    assert!(adapter.is_dirty(Path::new("/unknown")).await);
}
