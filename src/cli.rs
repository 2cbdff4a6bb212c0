// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sudoku-server`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "sudoku-server",
    version,
    about = "Serve an external puzzle program over HTTP, one bounded process per request.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Optional; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Listen address, overriding `[server].bind`.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Program to run per request, overriding `[command].program`.
    #[arg(long, value_name = "PATH")]
    pub program: Option<String>,

    /// Per-invocation deadline (e.g. `30s`), overriding `[command].timeout`.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SUDOKU_SERVER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate config, print it, but don't start the server.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
