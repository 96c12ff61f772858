// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::prelude::*;

#[test]
fn spawn_status_kill_cycle() {
    let state = tempfile::tempdir().unwrap();

    let out = swarm(
        state.path(),
        &["spawn", "w", "--process", "--cwd", "/tmp", "--", "sleep", "3600"],
    );
    assert_exit(&out, 0);
    assert!(stdout(&out).contains("spawned w (pid "), "{}", stdout(&out));

    // Live PID recorded, mux_info null.
    let reg = registry(state.path());
    let worker = &reg["workers"][0];
    assert_eq!(worker["name"], "w");
    assert!(worker["pid"].as_u64().is_some());
    assert!(worker["mux_info"].is_null());

    let out = swarm(state.path(), &["status", "w"]);
    assert_exit(&out, 0);
    assert!(stdout(&out).contains("w running"));

    assert_exit(&swarm(state.path(), &["kill", "w"]), 0);

    // Stopped exits 1; the record is kept.
    let out = swarm(state.path(), &["status", "w"]);
    assert_exit(&out, 1);
    assert!(stdout(&out).contains("w stopped"));
    assert_eq!(worker_names(state.path()), vec!["w"]);

    // Kills are idempotent.
    assert_exit(&swarm(state.path(), &["kill", "w"]), 0);
}

#[test]
fn duplicate_names_are_rejected() {
    let state = tempfile::tempdir().unwrap();
    let spawn_args = &["spawn", "w", "--process", "--cwd", "/tmp", "--", "sleep", "600"];
    assert_exit(&swarm(state.path(), spawn_args), 0);

    let out = swarm(state.path(), spawn_args);
    assert_exit(&out, 1);
    assert!(stderr(&out).contains("swarm: error: "), "{}", stderr(&out));
    assert!(stderr(&out).contains("already exists"), "{}", stderr(&out));
    assert_eq!(worker_names(state.path()), vec!["w"]);

    assert_exit(&swarm(state.path(), &["kill", "w"]), 0);
}

#[test]
fn unknown_worker_exits_two() {
    let state = tempfile::tempdir().unwrap();
    assert_exit(&swarm(state.path(), &["status", "ghost"]), 2);

    let out = swarm(state.path(), &["kill", "ghost"]);
    assert_exit(&out, 2);
    assert!(
        stderr(&out).contains("swarm: error: worker not found"),
        "{}",
        stderr(&out)
    );
}

#[test]
fn clean_removes_the_record() {
    let state = tempfile::tempdir().unwrap();
    assert_exit(
        &swarm(
            state.path(),
            &["spawn", "w", "--process", "--cwd", "/tmp", "--", "sleep", "600"],
        ),
        0,
    );

    assert_exit(&swarm(state.path(), &["clean", "w"]), 0);
    assert!(worker_names(state.path()).is_empty());
    assert_exit(&swarm(state.path(), &["status", "w"]), 2);
}

#[test]
fn wait_blocks_until_exit_and_times_out_otherwise() {
    let state = tempfile::tempdir().unwrap();
    assert_exit(
        &swarm(
            state.path(),
            &["spawn", "quick", "--process", "--cwd", "/tmp", "--", "sh", "-c", "sleep 0.3"],
        ),
        0,
    );
    assert_exit(&swarm(state.path(), &["wait", "quick", "--timeout", "30"]), 0);

    assert_exit(
        &swarm(
            state.path(),
            &["spawn", "slow", "--process", "--cwd", "/tmp", "--", "sleep", "600"],
        ),
        0,
    );
    let out = swarm(state.path(), &["wait", "slow", "--timeout", "1"]);
    assert_exit(&out, 1);
    assert!(
        stderr(&out).contains("timed out waiting for slow"),
        "{}",
        stderr(&out)
    );

    assert_exit(&swarm(state.path(), &["kill", "slow"]), 0);
}

#[test]
fn process_logs_capture_worker_output() {
    let state = tempfile::tempdir().unwrap();
    assert_exit(
        &swarm(
            state.path(),
            &[
                "spawn", "echoer", "--process", "--cwd", "/tmp", "--", "sh", "-c",
                "echo hello-from-worker",
            ],
        ),
        0,
    );
    assert_exit(&swarm(state.path(), &["wait", "echoer", "--timeout", "30"]), 0);

    let out = swarm(state.path(), &["logs", "echoer"]);
    assert_exit(&out, 0);
    assert!(stdout(&out).contains("hello-from-worker"), "{}", stdout(&out));
}

#[test]
fn env_entries_reach_the_worker() {
    let state = tempfile::tempdir().unwrap();
    assert_exit(
        &swarm(
            state.path(),
            &[
                "spawn", "envy", "--process", "--cwd", "/tmp", "--env",
                "SWARM_SPEC_VALUE=distinctive-42", "--", "sh", "-c", "echo $SWARM_SPEC_VALUE",
            ],
        ),
        0,
    );
    assert_exit(&swarm(state.path(), &["wait", "envy", "--timeout", "30"]), 0);

    let out = swarm(state.path(), &["logs", "envy"]);
    assert!(stdout(&out).contains("distinctive-42"), "{}", stdout(&out));
}

#[test]
fn bad_env_format_is_a_validation_error() {
    let state = tempfile::tempdir().unwrap();
    let out = swarm(
        state.path(),
        &["spawn", "w", "--process", "--cwd", "/tmp", "--env", "NOEQUALS", "--", "sleep", "1"],
    );
    assert_exit(&out, 1);
    assert!(stderr(&out).contains("swarm: error: "), "{}", stderr(&out));
    assert!(worker_names(state.path()).is_empty());
}

#[test]
fn ls_lists_workers_with_live_status() {
    let state = tempfile::tempdir().unwrap();
    assert_exit(
        &swarm(
            state.path(),
            &["spawn", "a", "--process", "--cwd", "/tmp", "--tag", "team-x", "--", "sleep", "600"],
        ),
        0,
    );

    let out = swarm(state.path(), &["ls"]);
    assert_exit(&out, 0);
    let text = stdout(&out);
    assert!(text.contains("a"), "{}", text);
    assert!(text.contains("running"), "{}", text);
    assert!(text.contains("team-x"), "{}", text);

    let out = swarm(state.path(), &["ls", "--tag", "other"]);
    assert!(stdout(&out).contains("no workers"));

    assert_exit(&swarm(state.path(), &["kill", "a"]), 0);
}
