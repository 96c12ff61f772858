// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn create_window_requires_session() {
    let mux = FakeMux::new();
    let result = mux
        .create_window("s", "w", Path::new("/tmp"), "sleep 1")
        .await;
    assert!(matches!(result, Err(MuxError::TargetMissing(_))));

    mux.ensure_session("s").await.unwrap();
    mux.create_window("s", "w", Path::new("/tmp"), "sleep 1")
        .await
        .unwrap();
    assert!(mux.window_exists("s", "w").await.unwrap());
}

#[tokio::test]
async fn captures_drain_and_last_repeats() {
    let mux = FakeMux::new();
    mux.add_window("s", "w", vec!["one", "two"]);

    assert_eq!(mux.capture_pane("s", "w", 10).await.unwrap(), "one");
    assert_eq!(mux.capture_pane("s", "w", 10).await.unwrap(), "two");
    assert_eq!(mux.capture_pane("s", "w", 10).await.unwrap(), "two");
}

#[tokio::test]
async fn kill_session_drops_its_windows() {
    let mux = FakeMux::new();
    mux.add_window("s", "w1", vec![]);
    mux.add_window("s", "w2", vec![]);
    mux.add_window("other", "w", vec![]);

    mux.kill_session("s").await.unwrap();
    assert!(!mux.window_exists("s", "w1").await.unwrap());
    assert!(!mux.window_exists("s", "w2").await.unwrap());
    assert!(mux.window_exists("other", "w").await.unwrap());
}

#[tokio::test]
async fn unavailable_fails_everything() {
    let mux = FakeMux::new();
    mux.add_window("s", "w", vec![]);
    mux.set_unavailable(true);

    assert!(matches!(
        mux.ensure_session("s").await,
        Err(MuxError::Unavailable(_))
    ));
    assert!(matches!(
        mux.capture_pane("s", "w", 10).await,
        Err(MuxError::Unavailable(_))
    ));
}

#[tokio::test]
async fn records_calls_in_order() {
    let mux = FakeMux::new();
    mux.ensure_session("s").await.unwrap();
    mux.create_window("s", "w", Path::new("/tmp"), "cmd")
        .await
        .unwrap();
    mux.send_text("s", "w", "hello").await.unwrap();
    mux.send_key("s", "w", ControlKey::Enter).await.unwrap();

    let calls = mux.calls();
    assert_eq!(calls.len(), 4);
    assert!(matches!(calls[2], MuxCall::SendText { ref text, .. } if text == "hello"));
    assert!(matches!(
        calls[3],
        MuxCall::SendKey {
            key: ControlKey::Enter,
            ..
        }
    ));
    assert_eq!(mux.sent_text("s", "w"), vec!["hello"]);
}

#[tokio::test]
async fn exit_code_reflects_scripting() {
    let mux = FakeMux::new();
    mux.add_window("s", "w", vec![]);
    assert_eq!(mux.pane_exit_code("s", "w").await.unwrap(), None);
    mux.set_exited("s", "w", 2);
    assert_eq!(mux.pane_exit_code("s", "w").await.unwrap(), Some(2));
}
