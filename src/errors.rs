// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Per-submission failures are never errors: they are [`ExecStatus`]
//! values. The variants here cover infrastructure problems only (bad
//! config, unreadable class directory, unwritable output directory).
//!
//! [`ExecStatus`]: crate::harness::ExecStatus

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MarkerError>;
