// src/exec/bounded.rs

//! Deadline enforcement for a single unit of external work.
//!
//! [`run_bounded`] starts the work on the caller's path, moves the blocking
//! wait onto its own Tokio task and races that task's join handle against a
//! timer. Whichever side of the race is observed first decides the outcome:
//!
//! - completion: the wait result is returned as-is;
//! - deadline: the cancel action runs, the wait task is drained, and
//!   [`ExecError::TimedOut`] is returned.
//!
//! The join handle is the completion channel. A finished task parks its
//! output in the task cell, so it never blocks delivering a result the caller
//! has stopped listening for.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::errors::ExecError;

/// A started unit of work: how to wait for it and how to stop it.
pub struct Started<W, C> {
    pub wait: W,
    pub cancel: C,
}

impl<W, C> Started<W, C> {
    pub fn new(wait: W, cancel: C) -> Self {
        Self { wait, cancel }
    }
}

/// Run `start`, then wait at most `timeout` for the started work to finish.
///
/// `start` runs synchronously so that spawn failures are reported straight
/// back without arming a timer. After a successful cancel the wait task is
/// always awaited before returning; if cancel fails its error is returned
/// immediately.
pub async fn run_bounded<T, S, W, C, CF>(timeout: Duration, start: S) -> Result<T, ExecError>
where
    T: Send + 'static,
    S: FnOnce() -> Result<Started<W, C>, ExecError>,
    W: Future<Output = Result<T, ExecError>> + Send + 'static,
    C: FnOnce() -> CF,
    CF: Future<Output = Result<(), ExecError>>,
{
    let Started { wait, cancel } = start()?;

    let mut completion = tokio::spawn(wait);
    debug!(timeout_ms = timeout.as_millis() as u64, "wait task spawned");

    tokio::select! {
        biased;

        joined = &mut completion => joined?,

        _ = tokio::time::sleep(timeout) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "deadline elapsed; cancelling");

            if let Err(err) = cancel().await {
                error!(error = %err, "cancel failed; not draining wait task");
                return Err(err);
            }

            match completion.await {
                Ok(Ok(_)) => debug!("wait task drained after cancel (exited cleanly)"),
                Ok(Err(err)) => debug!(error = %err, "wait task drained after cancel"),
                Err(err) => debug!(error = %err, "wait task failed while draining"),
            }

            Err(ExecError::TimedOut)
        }
    }
}
