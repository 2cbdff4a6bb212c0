// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] covers one invocation of the external program. Its
//!   `Display` text is what HTTP clients see in a 500 response body.
//! - [`ServerError`] covers everything around it: configuration, binding
//!   the listener, and so on.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure of a single bounded invocation.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The program could not be launched at all.
    #[error("failed to start `{program}`: {source}")]
    Start {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran but exited unsuccessfully before the deadline.
    #[error("{}", describe_exit(.0))]
    Exited(ExitStatus),

    /// Piping input/output or waiting on the process failed.
    #[error("I/O error while running process: {0}")]
    Io(#[from] io::Error),

    /// The deadline elapsed; the process was killed and reaped.
    #[error("execution timed out")]
    TimedOut,

    /// The kill action itself failed.
    #[error("failed to kill process: {0}")]
    Cancel(#[source] io::Error),

    /// The background wait task panicked or was aborted.
    #[error("wait task failed: {0}")]
    WaitTask(#[from] tokio::task::JoinError),
}

impl ExecError {
    /// Whether the process ran to its natural end before this error was
    /// produced. False for timeouts and failed kills, where the process was
    /// still running when the deadline fired.
    pub fn finished(&self) -> bool {
        !matches!(self, ExecError::TimedOut | ExecError::Cancel(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::TimedOut)
    }
}

/// `exit status 2`, or `signal: 9` when the process was killed by a signal.
fn describe_exit(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit status {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal: {signal}");
        }
    }
    status.to_string()
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_fixed() {
        assert_eq!(ExecError::TimedOut.to_string(), "execution timed out");
    }

    #[test]
    fn finished_flag_follows_outcome() {
        assert!(!ExecError::TimedOut.finished());
        assert!(!ExecError::Cancel(io::Error::other("gone")).finished());
        assert!(ExecError::Io(io::Error::other("pipe")).finished());
        assert!(
            ExecError::Start {
                program: "nope".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .finished()
        );
    }

    #[test]
    fn start_error_names_program() {
        let err = ExecError::Start {
            program: "sudoku".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("failed to start `sudoku`"));
    }

    #[cfg(unix)]
    #[test]
    fn exit_text_is_plain() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(
            ExecError::Exited(ExitStatus::from_raw(2 << 8)).to_string(),
            "exit status 2"
        );
        assert_eq!(
            ExecError::Exited(ExitStatus::from_raw(9)).to_string(),
            "signal: 9"
        );
    }
}
