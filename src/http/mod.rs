// src/http/mod.rs

//! HTTP surface.
//!
//! Two actions map onto the external program (`/generate`, `/solve`). Both
//! accept any method. [`configure`] is used by the real server and by
//! `actix_web::test` apps alike.

pub mod handlers;
pub mod query;

use std::sync::Arc;

use actix_web::web;

use crate::config::ServerConfig;
use crate::exec::{CommandBackend, CommandRunner};

/// Shared, read-only per-server state.
pub struct AppState {
    backend: Arc<dyn CommandBackend>,
    default_difficulty: i64,
}

impl AppState {
    pub fn new(backend: Arc<dyn CommandBackend>, default_difficulty: i64) -> Self {
        Self {
            backend,
            default_difficulty,
        }
    }

    /// Production state: a real [`CommandRunner`] built from `cfg`.
    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self::new(
            Arc::new(CommandRunner::from_config(cfg)),
            cfg.default_difficulty,
        )
    }

    pub fn backend(&self) -> &dyn CommandBackend {
        self.backend.as_ref()
    }

    pub fn default_difficulty(&self) -> i64 {
        self.default_difficulty
    }
}

/// Register state and routes on an actix `App`:
///
/// ```ignore
/// App::new().configure(http::configure(state.clone()))
/// ```
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state)
            .route("/generate", web::to(handlers::generate))
            .route("/solve", web::to(handlers::solve));
    }
}
