#![cfg(unix)]

mod common;
use crate::common::{gone_within, init_tracing, pid_alive, sh_args, with_timeout};

use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::runtime::Handle;

use sudoku_server::errors::ExecError;
use sudoku_server::exec::{CommandBackend, CommandRunner, input_from_bytes};

fn alive_tasks() -> usize {
    Handle::current().metrics().num_alive_tasks()
}

#[tokio::test]
async fn quick_program_output_is_returned_exactly() {
    init_tracing();
    let runner = CommandRunner::new("/bin/sh", Duration::from_secs(30));

    let out = with_timeout(runner.run(None, &sh_args("printf 42; exit 0", &[])))
        .await
        .unwrap();

    assert_eq!(out, "42");
    assert_eq!(alive_tasks(), 0, "no background task may outlive the call");
}

#[tokio::test]
async fn hung_program_times_out_and_is_reaped() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let body = format!(
        "echo $$ > '{}'; trap '' TERM; exec sleep 60",
        pid_file.display()
    );
    let runner = CommandRunner::new("/bin/sh", Duration::from_millis(500));

    let started = Instant::now();
    let err = with_timeout(runner.run(None, &sh_args(&body, &[])))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "got {err:?}");
    assert_eq!(err.to_string(), "execution timed out");
    assert!(elapsed >= Duration::from_millis(500), "returned early: {elapsed:?}");

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(!pid_alive(&pid), "killed process must be gone");
    assert_eq!(alive_tasks(), 0, "wait task must be drained after a kill");
}

#[tokio::test]
async fn timeout_discards_partial_output() {
    let runner = CommandRunner::new("/bin/sh", Duration::from_millis(300));

    let err = with_timeout(runner.run(None, &sh_args("echo partial; exec sleep 60", &[])))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::TimedOut));
}

#[tokio::test]
async fn input_reaches_stdin_through_the_backend_trait() {
    let runner = CommandRunner::new("/bin/sh", Duration::from_secs(30));
    let backend: &dyn CommandBackend = &runner;

    let out = with_timeout(backend.execute(
        Some(input_from_bytes("row1\nrow2\n")),
        sh_args("tr a-z A-Z", &[]),
    ))
    .await
    .unwrap();

    assert_eq!(out, "ROW1\nROW2\n");
}

#[tokio::test]
async fn exit_failure_is_reported_before_deadline() {
    let runner = CommandRunner::new("/bin/sh", Duration::from_secs(30));

    let err = with_timeout(runner.run(None, &sh_args("echo oops >&2; exit 1", &[])))
        .await
        .unwrap_err();

    assert!(err.finished());
    match err {
        ExecError::Exited(status) => assert_eq!(status.code(), Some(1)),
        other => panic!("expected exit failure, got {other:?}"),
    }
}

#[tokio::test]
async fn start_failure_is_immediate() {
    let runner = CommandRunner::new("/definitely/not/here", Duration::from_secs(30));

    let started = Instant::now();
    let err = runner.run(None, &[]).await.unwrap_err();

    assert!(matches!(err, ExecError::Start { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(alive_tasks(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_are_independent() {
    let fast = CommandRunner::new("/bin/sh", Duration::from_secs(30));
    let slow = CommandRunner::new("/bin/sh", Duration::from_millis(300));

    let fast_args = sh_args("printf fast", &[]);
    let slow_args = sh_args("exec sleep 60", &[]);
    let cat_args = sh_args("cat", &[]);

    let (a, b, c) = with_timeout(async {
        tokio::join!(
            fast.run(None, &fast_args),
            slow.run(None, &slow_args),
            fast.run(Some(input_from_bytes("x")), &cat_args),
        )
    })
    .await;

    assert_eq!(a.unwrap(), "fast");
    assert!(b.unwrap_err().is_timeout());
    assert_eq!(c.unwrap(), "x");
}

#[tokio::test]
async fn abandoned_invocation_kills_its_process() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let body = format!("echo $$ > '{}'; exec sleep 60", pid_file.display());
    let runner = CommandRunner::new("/bin/sh", Duration::from_secs(30));
    let args = sh_args(&body, &[]);

    // Give up on the call long before its deadline.
    let gave_up = tokio::time::timeout(Duration::from_millis(500), runner.run(None, &args)).await;
    assert!(gave_up.is_err());

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(
        gone_within(&pid, Duration::from_secs(5)).await,
        "abandoned process must be killed"
    );
}

#[tokio::test]
async fn timeout_kills_helpers_of_a_wrapper_script() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("helper.pid");
    // No `exec`: the shell stays the direct child and a forked helper holds
    // stdout open.
    let body = format!(
        "trap '' TERM; sleep 30 & echo $! > '{}'; wait",
        pid_file.display()
    );
    let runner = CommandRunner::new("/bin/sh", Duration::from_millis(300));

    let started = Instant::now();
    let err = with_timeout(runner.run(None, &sh_args(&body, &[])))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "got {err:?}");
    assert!(elapsed < Duration::from_secs(2), "deadline overrun: {elapsed:?}");

    let helper = std::fs::read_to_string(&pid_file).unwrap();
    assert!(
        gone_within(&helper, Duration::from_secs(2)).await,
        "helper {} survived the kill",
        helper.trim()
    );
    assert_eq!(alive_tasks(), 0);
}
