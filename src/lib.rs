// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod http;
pub mod logging;
pub mod server;
pub mod types;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{RawConfigFile, ServerConfig, load_from_path};
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - `--dry-run` output
/// - the HTTP server
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = build_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    server::run(cfg).await
}

/// Resolve the effective configuration: the config file (or built-in
/// defaults), then CLI overrides, then validation.
pub fn build_config(args: &CliArgs) -> Result<ServerConfig> {
    let mut raw = match args.config.as_deref() {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };

    if let Some(ref bind) = args.bind {
        raw.server.bind = bind.clone();
    }
    if let Some(ref program) = args.program {
        raw.command.program = program.clone();
    }
    if let Some(ref timeout) = args.timeout {
        raw.command.timeout = timeout.clone();
    }

    ServerConfig::try_from(raw)
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ServerConfig) {
    println!("sudoku-server dry-run");
    println!("  server.bind = {}", cfg.bind);
    match cfg.workers {
        Some(n) => println!("  server.workers = {n}"),
        None => println!("  server.workers = (actix default)"),
    }
    println!("  command.program = {}", cfg.program);
    println!("  command.timeout = {:?}", cfg.timeout);
    println!("  generate.default_difficulty = {}", cfg.default_difficulty);

    debug!("dry-run complete (server not started)");
}
