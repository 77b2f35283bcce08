// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `labmark`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "labmark",
    version,
    about = "Locate, run and classify student client submissions against a reference server.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory containing one sub-directory per submission.
    #[arg(value_name = "CLASS_PATH")]
    pub class_path: PathBuf,

    /// Directory where `<submission>_output.txt` files are written.
    ///
    /// Created if it does not exist.
    #[arg(long, short, value_name = "DIR", default_value = "marking_output")]
    pub output: PathBuf,

    /// Select submissions one at a time instead of marking all of them.
    #[arg(long)]
    pub manual: bool,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `labmark.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Hostname of the reference server (overrides `[server].host`).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port of the reference server (overrides `[server].port`).
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LABMARK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// List submissions and detected languages, but don't run anything.
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
