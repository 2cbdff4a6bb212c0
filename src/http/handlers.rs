// src/http/handlers.rs

use std::fmt::Display;
use std::io;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::errors::ExecError;
use crate::exec::{Input, InputSender};
use crate::http::AppState;
use crate::http::query::difficulty_from_query;
use crate::types::Action;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Request body chunks buffered ahead of the program's stdin.
const BODY_CHUNKS: usize = 16;

/// `/generate[?difficulty=N]`
pub async fn generate(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let difficulty = difficulty_from_query(req.query_string(), state.default_difficulty());
    invoke(&req, &state, Action::Generate { difficulty }, None).await
}

/// `/solve` with the puzzle as the request body, streamed to stdin.
pub async fn solve(req: HttpRequest, body: web::Payload, state: web::Data<AppState>) -> HttpResponse {
    let (tx, input) = Input::channel(BODY_CHUNKS);
    let (response, ()) = tokio::join!(
        invoke(&req, &state, Action::Solve, Some(input)),
        forward_body(body, tx),
    );
    response
}

/// Pump body chunks into `tx` until the body ends, fails, or the program
/// stops reading.
///
/// The payload is tied to the worker thread; the channel carries its bytes
/// to the process task.
async fn forward_body<S, E>(mut body: S, tx: InputSender)
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut forwarded = 0usize;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| io::Error::other(format!("reading request body: {e}")));
        let failed = chunk.is_err();
        if let Ok(bytes) = &chunk {
            forwarded += bytes.len();
        }
        if tx.send(chunk).await.is_err() {
            debug!(forwarded, "program stopped reading the request body");
            return;
        }
        if failed {
            return;
        }
    }
    debug!(forwarded, "request body forwarded");
}

async fn invoke(
    req: &HttpRequest,
    state: &AppState,
    action: Action,
    input: Option<Input>,
) -> HttpResponse {
    let span = info_span!(
        "request",
        method = %req.method(),
        path = %req.path(),
        action = action.name(),
    );

    async move {
        let result = state.backend().execute(input, action.args()).await;
        match &result {
            Ok(out) => info!(%action, bytes = out.len(), "action succeeded"),
            Err(err) => warn!(%action, error = %err, "action failed"),
        }
        respond(result)
    }
    .instrument(span)
    .await
}

/// Map an invocation result onto the wire: output as-is on success, the
/// error text on a 500 otherwise.
pub fn respond(result: Result<String, ExecError>) -> HttpResponse {
    match result {
        Ok(output) => HttpResponse::Ok().content_type(TEXT_PLAIN).body(output),
        Err(err) => HttpResponse::InternalServerError()
            .content_type(TEXT_PLAIN)
            .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .body(format!("{err}\n")),
    }
}
