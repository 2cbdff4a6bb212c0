// src/config/model.rs

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_PROGRAM: &str = "sudoku";
pub const DEFAULT_TIMEOUT: &str = "30s";
pub const DEFAULT_DIFFICULTY: i64 = 20;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// bind = "0.0.0.0:8080"
/// workers = 4
///
/// [command]
/// program = "/usr/local/bin/sudoku"
/// timeout = "30s"
///
/// [generate]
/// default_difficulty = 20
/// ```
///
/// All sections are optional and have the defaults shown above (except
/// `workers`, which defaults to the actix-web choice).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub command: CommandSection,

    #[serde(default)]
    pub generate: GenerateSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Listen address, e.g. `"127.0.0.1:8080"`.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Number of HTTP worker threads; `None` lets actix-web decide.
    #[serde(default)]
    pub workers: Option<usize>,
}

/// `[command]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    /// Program to spawn for each request (looked up on `PATH`).
    #[serde(default = "default_program")]
    pub program: String,

    /// Wall-clock deadline per invocation (`"30s"`, `"1500ms"`, `"2m"`).
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

/// `[generate]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateSection {
    /// Difficulty used when the query string has no usable `difficulty`.
    #[serde(default = "default_difficulty")]
    pub default_difficulty: i64,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

fn default_difficulty() -> i64 {
    DEFAULT_DIFFICULTY
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            workers: None,
        }
    }
}

impl Default for CommandSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout: default_timeout(),
        }
    }
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            default_difficulty: default_difficulty(),
        }
    }
}

/// Validated, ready-to-use configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// every value here has passed the semantic checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub workers: Option<usize>,
    pub program: String,
    pub timeout: Duration,
    pub default_difficulty: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            workers: None,
            program: DEFAULT_PROGRAM.to_string(),
            timeout: Duration::from_secs(30),
            default_difficulty: DEFAULT_DIFFICULTY,
        }
    }
}
