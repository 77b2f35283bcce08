// src/logging.rs

//! Logging for `labmark`.
//!
//! The filter is chosen as follows, first match wins:
//! 1. `--log-level`
//! 2. `LABMARK_LOG`, either a level name (`debug`) or a full filter
//!    directive (`labmark::harness=trace,info`)
//! 3. `info`
//!
//! Everything goes to stderr. Stdout carries operator prompts and, in
//! manual mode, the echoed output of the submission under test.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV: &str = "LABMARK_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(Level::from(level).as_str()),
        None => filter_from_env(std::env::var(LOG_ENV).ok().as_deref()),
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("initialising logging: {err}"))
}

fn filter_from_env(value: Option<&str>) -> EnvFilter {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return EnvFilter::new("info");
    };
    if let Some(level) = parse_level_str(value) {
        return EnvFilter::new(level.as_str());
    }
    EnvFilter::try_new(value).unwrap_or_else(|err| {
        eprintln!("labmark: ignoring invalid {LOG_ENV} value {value:?}: {err}");
        EnvFilter::new("info")
    })
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Plain level name, case-insensitive; `warning` is accepted for `warn`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
