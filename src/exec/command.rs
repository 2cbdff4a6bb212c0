// src/exec/command.rs

//! One external program, invoked once per request under a deadline.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::ExecError;
use crate::exec::bounded::{Started, run_bounded};
use crate::exec::process::{self, Input};

/// Runs a fixed program with per-call arguments and input.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self::new(cfg.program.clone(), cfg.timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the program once with `args`, streaming `input` (if any) to its
    /// stdin, and return everything it wrote to stdout.
    ///
    /// Output is discarded on any failure. Non-UTF-8 output is converted
    /// lossily.
    pub async fn run(&self, input: Option<Input>, args: &[String]) -> Result<String, ExecError> {
        let started_at = Instant::now();
        info!(program = %self.program, ?args, has_input = input.is_some(), "starting invocation");

        let result = run_bounded(self.timeout, move || {
            let child = self.spawn(args, input.is_some())?;
            let (wait, kill) = process::supervise(child, input);
            Ok(Started::new(wait, move || kill.kill()))
        })
        .await;

        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        match result {
            Ok(bytes) => {
                info!(program = %self.program, elapsed_ms, bytes = bytes.len(), "invocation completed");
                Ok(into_string(bytes))
            }
            Err(err) => {
                warn!(
                    program = %self.program,
                    elapsed_ms,
                    finished = err.finished(),
                    error = %err,
                    "invocation failed"
                );
                Err(err)
            }
        }
    }

    fn spawn(&self, args: &[String], has_input: bool) -> Result<Child, ExecError> {
        let mut std_cmd = std::process::Command::new(&self.program);
        std_cmd
            .args(args)
            .stdin(if has_input { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Own process group, so a kill reaches anything the program forks.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            std_cmd.process_group(0);
        }

        let mut cmd = Command::from(std_cmd);
        cmd.kill_on_drop(true);

        cmd.spawn().map_err(|source| ExecError::Start {
            program: self.program.clone(),
            source,
        })
    }
}

fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
