// src/server.rs

//! Network listener.

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::Result;
use crate::http::{self, AppState};

/// Bind the configured address and serve until the server shuts down
/// (Ctrl-C / SIGTERM).
///
/// A bind failure is returned as an error; there is no retry.
pub async fn run(cfg: ServerConfig) -> Result<()> {
    let state = web::Data::new(AppState::from_config(&cfg));

    info!(
        bind = %cfg.bind,
        program = %cfg.program,
        timeout_ms = cfg.timeout.as_millis() as u64,
        default_difficulty = cfg.default_difficulty,
        "starting HTTP server"
    );

    let mut server =
        HttpServer::new(move || App::new().configure(http::configure(state.clone())));
    if let Some(workers) = cfg.workers {
        server = server.workers(workers);
    }

    server
        .bind(cfg.bind)
        .with_context(|| format!("binding HTTP listener on {}", cfg.bind))?
        .run()
        .await
        .context("running HTTP server")?;

    info!("HTTP server stopped");
    Ok(())
}
