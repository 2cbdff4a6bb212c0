// src/exec/process.rs

//! Supervision of one spawned child process.
//!
//! [`supervise`] splits a freshly spawned [`Child`] into the two halves the
//! bounded executor needs:
//!
//! - a `'static` wait future that owns the child, feeds its stdin, buffers
//!   its stdout, logs its stderr and reaps it;
//! - a [`KillSwitch`] that asks the wait future to kill the child.
//!
//! The child is never shared: a kill is a message to whoever owns it. If the
//! switch is dropped without being used while the child is still running,
//! the invocation was abandoned and the child is killed as well. On Unix a
//! kill also reaches the child's process group.

use std::future::Future;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::errors::ExecError;

/// How long the output pipes may stay open after a kill before the wait
/// future stops reading them.
const PIPE_GRACE: Duration = Duration::from_millis(200);

/// Data streamed to the child's stdin, one chunk at a time.
///
/// The sending half is dropped to signal end of input; an `Err` chunk aborts
/// the invocation with [`ExecError::Io`].
pub struct Input {
    rx: mpsc::Receiver<io::Result<Bytes>>,
}

/// Sending half of an [`Input`].
pub type InputSender = mpsc::Sender<io::Result<Bytes>>;

impl Input {
    /// A bounded channel holding at most `chunks` unread chunks.
    pub fn channel(chunks: usize) -> (InputSender, Input) {
        let (tx, rx) = mpsc::channel(chunks);
        (tx, Input { rx })
    }

    /// Next chunk, or `None` once the sender is gone.
    pub async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        self.rx.recv().await
    }
}

/// Wrap an in-memory buffer as process input.
pub fn input_from_bytes(bytes: impl Into<Bytes>) -> Input {
    let (tx, input) = Input::channel(1);
    // Capacity 1 and a fresh receiver: this cannot fail.
    let _ = tx.try_send(Ok(bytes.into()));
    input
}

type KillReply = oneshot::Sender<io::Result<()>>;

/// Requests termination of a supervised child.
pub struct KillSwitch {
    tx: oneshot::Sender<KillReply>,
}

impl KillSwitch {
    /// Kill the child and report whether the kill signal was delivered.
    ///
    /// Fails with [`ExecError::Cancel`] if the child was already reaped.
    pub async fn kill(self) -> Result<(), ExecError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(reply_tx).is_err() {
            return Err(already_finished());
        }
        match reply_rx.await {
            Ok(delivered) => delivered.map_err(ExecError::Cancel),
            Err(_) => Err(already_finished()),
        }
    }
}

fn already_finished() -> ExecError {
    ExecError::Cancel(io::Error::other("process already finished"))
}

/// Take ownership of `child` and return its wait future and kill switch.
///
/// The wait future resolves once the child has exited and both of its output
/// pipes are closed, yielding everything it wrote to stdout. After a kill the
/// pipes get [`PIPE_GRACE`] to close before they are dropped.
pub fn supervise(
    mut child: Child,
    input: Option<Input>,
) -> (
    impl Future<Output = Result<Vec<u8>, ExecError>> + Send + 'static,
    KillSwitch,
) {
    let (kill_tx, kill_rx) = oneshot::channel::<KillReply>();
    let pid = child.id();
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let wait = async move {
        let (killed_tx, killed_rx) = oneshot::channel::<()>();
        let pipes = async {
            tokio::join!(
                read_stdout(stdout),
                feed_stdin(stdin, input),
                drain_stderr(stderr, pid),
            )
        };

        let (status, pipes) = tokio::join!(
            wait_or_kill(&mut child, pid, kill_rx, killed_tx),
            release_after_kill(pipes, killed_rx),
        );

        let status = status?;
        debug!(?pid, %status, "process exited");
        if !status.success() {
            return Err(ExecError::Exited(status));
        }
        let Some((output, fed, ())) = pipes else {
            return Err(ExecError::Io(io::Error::other(
                "output pipes still open after kill",
            )));
        };
        let output = output?;
        fed?;
        Ok(output)
    };

    (wait, KillSwitch { tx: kill_tx })
}

async fn wait_or_kill(
    child: &mut Child,
    pid: Option<u32>,
    mut kill_rx: oneshot::Receiver<KillReply>,
    killed_tx: oneshot::Sender<()>,
) -> io::Result<ExitStatus> {
    tokio::select! {
        status = child.wait() => status,

        request = &mut kill_rx => {
            let killed = kill_tree(child, pid);
            let _ = killed_tx.send(());
            match request {
                Ok(reply) => {
                    let _ = reply.send(killed);
                }
                Err(_) => {
                    debug!(?pid, "invocation abandoned; killing process");
                }
            }
            child.wait().await
        }
    }
}

/// Kill the child and, on Unix, every process left in its process group.
///
/// The child has not been reaped yet, so its pid still names its group.
fn kill_tree(child: &mut Child, pid: Option<u32>) -> io::Result<()> {
    if let Some(pgid) = pid {
        kill_group(pgid);
    }
    child.start_kill()
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    if let Err(errno) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(pgid, %errno, "process group not signalled");
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

/// Drive the pipe work to completion, unless the process was killed and the
/// pipes are still open [`PIPE_GRACE`] later.
async fn release_after_kill<F>(pipes: F, killed: oneshot::Receiver<()>) -> Option<F::Output>
where
    F: Future,
{
    let give_up = async {
        match killed.await {
            Ok(()) => tokio::time::sleep(PIPE_GRACE).await,
            // Natural exit: the pipes always get to finish.
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;

        done = pipes => Some(done),

        () = give_up => {
            debug!("output pipes still held after kill; dropping them");
            None
        }
    }
}

async fn read_stdout(stdout: Option<ChildStdout>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stdout) = stdout {
        stdout.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Copy `input` into the child's stdin as chunks arrive, then close it.
///
/// A child that exits without consuming its input closes the pipe early;
/// the resulting `BrokenPipe` is not an error.
async fn feed_stdin(stdin: Option<ChildStdin>, input: Option<Input>) -> io::Result<()> {
    let (Some(mut stdin), Some(mut input)) = (stdin, input) else {
        return Ok(());
    };

    let copied = async {
        let mut n = 0usize;
        while let Some(chunk) = input.next_chunk().await {
            let chunk = chunk?;
            stdin.write_all(&chunk).await?;
            n += chunk.len();
        }
        stdin.shutdown().await?;
        Ok::<_, io::Error>(n)
    }
    .await;
    drop(stdin);

    match copied {
        Ok(n) => {
            debug!(bytes = n, "stdin fed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("process closed stdin before consuming all input");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Always consume stderr so the pipe never fills; log at debug.
async fn drain_stderr(stderr: Option<ChildStderr>, pid: Option<u32>) {
    let Some(stderr) = stderr else {
        return;
    };
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(?pid, "stderr: {}", line);
    }
}
