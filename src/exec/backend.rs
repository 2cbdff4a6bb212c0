// src/exec/backend.rs

//! Pluggable command backend.
//!
//! The HTTP layer talks to a `CommandBackend` instead of a concrete
//! [`CommandRunner`]. Production wires in the runner; tests can provide a
//! backend that records invocations and returns canned results without
//! spawning processes.

use std::future::Future;
use std::pin::Pin;

use crate::errors::ExecError;
use crate::exec::command::CommandRunner;
use crate::exec::process::Input;

/// Boxed future returned by [`CommandBackend::execute`].
pub type ExecFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ExecError>> + Send + 'a>>;

/// Trait abstracting how one invocation of the external program runs.
pub trait CommandBackend: Send + Sync {
    /// Run the program with `args`, feeding `input` to its stdin if given,
    /// and resolve to its captured stdout.
    fn execute(&self, input: Option<Input>, args: Vec<String>) -> ExecFuture<'_>;
}

impl CommandBackend for CommandRunner {
    fn execute(&self, input: Option<Input>, args: Vec<String>) -> ExecFuture<'_> {
        Box::pin(async move { self.run(input, &args).await })
    }
}
