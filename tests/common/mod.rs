#![allow(dead_code)]

pub use sudoku_server_test_utils::builders::ConfigBuilder;
pub use sudoku_server_test_utils::fake_backend::{FakeBackend, FakeReply, Invocation};
pub use sudoku_server_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::web;
use sudoku_server::exec::CommandBackend;
use sudoku_server::http::AppState;

/// App state around an arbitrary backend.
pub fn state_with(backend: Arc<dyn CommandBackend>, default_difficulty: i64) -> web::Data<AppState> {
    web::Data::new(AppState::new(backend, default_difficulty))
}

/// `sh -c <body> sh <extra...>` as an argument vector.
pub fn sh_args(body: &str, extra: &[&str]) -> Vec<String> {
    let mut args = vec!["-c".to_string(), body.to_string(), "sh".to_string()];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

/// Whether a process with this pid is still running.
///
/// Zombies count as gone: a killed grandchild waits for its new parent to
/// reap it, which is outside our control.
#[cfg(unix)]
pub fn pid_alive(pid: &str) -> bool {
    let pid = pid.trim();
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        let state = stat.rsplit(')').next().and_then(|rest| rest.trim_start().chars().next());
        return !matches!(state, Some('Z') | Some('X'));
    }
    if std::path::Path::new("/proc/self/stat").exists() {
        return false;
    }
    std::process::Command::new("/bin/sh")
        .arg("-c")
        .arg(format!("kill -0 {pid} 2>/dev/null"))
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Poll `pid_alive` until the process is gone or `within` elapses.
#[cfg(unix)]
pub async fn gone_within(pid: &str, within: Duration) -> bool {
    let deadline = Instant::now() + within;
    while pid_alive(pid) {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    true
}
