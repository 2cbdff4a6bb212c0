// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the external program once per request, using
//! `tokio::process::Command`, and makes sure no invocation outlives its
//! deadline.
//!
//! - [`bounded`] races a started unit of work against a timer and cancels it
//!   when the deadline wins.
//! - [`process`] owns a spawned child: feeds stdin, buffers stdout, drains
//!   stderr and kills its process group on request.
//! - [`command`] builds the concrete invocation and ties the two together.
//! - [`backend`] provides the `CommandBackend` trait the HTTP layer calls,
//!   which tests can replace with a fake implementation.

pub mod backend;
pub mod bounded;
pub mod command;
pub mod process;

pub use backend::{CommandBackend, ExecFuture};
pub use bounded::{Started, run_bounded};
pub use command::CommandRunner;
pub use process::{Input, InputSender, KillSwitch, input_from_bytes, supervise};
