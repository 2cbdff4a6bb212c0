use std::sync::{Arc, Mutex};
use std::time::Duration;

use sudoku_server::errors::ExecError;
use sudoku_server::exec::{CommandBackend, ExecFuture, Input};

/// One recorded call to [`FakeBackend::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    /// `None` when no input stream was supplied.
    pub input: Option<Vec<u8>>,
}

/// What the fake answers with.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Succeed with this output.
    Output(String),
    /// Succeed with the received input echoed back.
    EchoInput,
    /// Fail with `execution timed out`.
    TimedOut,
    /// Fail as if the program could not be started.
    StartFailure,
    /// Sleep before answering with the inner reply.
    Delayed(Duration, Box<FakeReply>),
}

/// A fake backend that:
/// - records every invocation (arguments and fully-read input)
/// - answers with a canned [`FakeReply`] without spawning anything.
#[derive(Clone)]
pub struct FakeBackend {
    reply: FakeReply,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeBackend {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(output: &str) -> Self {
        Self::new(FakeReply::Output(output.to_string()))
    }

    /// Snapshot of recorded invocations, oldest first.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandBackend for FakeBackend {
    fn execute(&self, input: Option<Input>, args: Vec<String>) -> ExecFuture<'_> {
        let calls = Arc::clone(&self.calls);
        let reply = self.reply.clone();

        Box::pin(async move {
            let input = match input {
                Some(mut input) => {
                    let mut buf = Vec::new();
                    while let Some(chunk) = input.next_chunk().await {
                        buf.extend_from_slice(&chunk?);
                    }
                    Some(buf)
                }
                None => None,
            };

            calls.lock().unwrap().push(Invocation {
                args,
                input: input.clone(),
            });

            answer(reply, input).await
        })
    }
}

async fn answer(reply: FakeReply, input: Option<Vec<u8>>) -> Result<String, ExecError> {
    let mut reply = reply;
    let reply = loop {
        match reply {
            FakeReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            other => break other,
        }
    };

    match reply {
        FakeReply::Output(out) => Ok(out),
        FakeReply::EchoInput => Ok(String::from_utf8_lossy(&input.unwrap_or_default()).into_owned()),
        FakeReply::TimedOut => Err(ExecError::TimedOut),
        FakeReply::StartFailure => Err(ExecError::Start {
            program: "sudoku".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }),
        FakeReply::Delayed(..) => unreachable!("delays are unwrapped above"),
    }
}
