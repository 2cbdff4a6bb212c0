// src/config/validate.rs

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::model::{RawConfigFile, ServerConfig};
use crate::errors::{Result, ServerError};

impl TryFrom<RawConfigFile> for ServerConfig {
    type Error = ServerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let bind = validate_bind(&raw.server.bind)?;
        validate_workers(raw.server.workers)?;
        validate_program(&raw.command.program)?;
        let timeout = validate_timeout(&raw.command.timeout)?;

        Ok(ServerConfig {
            bind,
            workers: raw.server.workers,
            program: raw.command.program,
            timeout,
            default_difficulty: raw.generate.default_difficulty,
        })
    }
}

fn validate_bind(bind: &str) -> Result<SocketAddr> {
    bind.trim().parse().map_err(|e| {
        ServerError::ConfigError(format!("[server].bind '{bind}' is not a socket address: {e}"))
    })
}

fn validate_workers(workers: Option<usize>) -> Result<()> {
    if workers == Some(0) {
        return Err(ServerError::ConfigError(
            "[server].workers must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_program(program: &str) -> Result<()> {
    if program.trim().is_empty() {
        return Err(ServerError::ConfigError(
            "[command].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_timeout(timeout: &str) -> Result<Duration> {
    let parsed = parse_duration(timeout)
        .map_err(|e| ServerError::ConfigError(format!("[command].timeout: {e}")))?;
    if parsed.is_zero() {
        return Err(ServerError::ConfigError(
            "[command].timeout must be greater than zero".to_string(),
        ));
    }
    Ok(parsed)
}

/// Parse a simple duration string like `"30s"`, `"500ms"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

    let secs_per_unit = match unit_part.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        unit => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' too large"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::DEFAULT_DIFFICULTY;

    #[test]
    fn defaults_validate() {
        let cfg = ServerConfig::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.program, "sudoku");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.default_difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(cfg.workers, None);
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration(" 30s ").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1H").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10d").is_err());
    }

    #[test]
    fn oversized_durations_are_errors() {
        let err = parse_duration("5124095576030432h").unwrap_err();
        assert!(err.contains("too large"), "{err}");
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
        assert_eq!(
            parse_duration("18446744073709551615s").unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn oversized_timeout_is_a_config_error() {
        let mut raw = RawConfigFile::default();
        raw.command.timeout = "5124095576030432h".into();
        let err = ServerConfig::try_from(raw).unwrap_err();
        assert!(matches!(err, ServerError::ConfigError(msg) if msg.contains("too large")));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.command.timeout = "0s".into();
        let err = ServerConfig::try_from(raw).unwrap_err();
        assert!(matches!(err, ServerError::ConfigError(msg) if msg.contains("timeout")));
    }

    #[test]
    fn bad_bind_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.server.bind = ":8080".into();
        assert!(ServerConfig::try_from(raw).is_err());
    }

    #[test]
    fn zero_workers_and_empty_program_are_rejected() {
        let mut raw = RawConfigFile::default();
        raw.server.workers = Some(0);
        assert!(ServerConfig::try_from(raw).is_err());

        let mut raw = RawConfigFile::default();
        raw.command.program = "  ".into();
        assert!(ServerConfig::try_from(raw).is_err());
    }
}
