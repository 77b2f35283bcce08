// src/lib.rs

pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod harness;
pub mod locate;
pub mod logging;
pub mod sink;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::batch::{Marker, TerminalOperator};
use crate::cli::CliArgs;
use crate::config::{load_raw_or_default, MarkerConfig};
use crate::fs::{FileSystem, RealFileSystem};
use crate::harness::ShellLauncher;
use crate::sink::FileSinkFactory;
use crate::types::MarkingMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - the output directory and per-submission file sinks
/// - the shell launcher and real filesystem
/// - automatic or manual marking driven from the terminal
pub async fn run(args: CliArgs) -> Result<()> {
    let mut raw = load_raw_or_default(args.config.as_deref())?;
    raw.server.apply_overrides(args.host.as_deref(), args.port);
    let cfg = MarkerConfig::try_from(raw)?;

    let fs = Arc::new(RealFileSystem);
    if !fs.is_dir(&args.class_path) {
        bail!("class path {:?} is not a directory", args.class_path);
    }

    let launcher = Box::new(ShellLauncher::new(&cfg.harness));

    if args.dry_run {
        // Nothing gets written in a dry run, so don't create the output dir.
        let sinks = Box::new(NoSinks);
        let marker = Marker::new(&cfg, fs, launcher, sinks);
        return print_dry_run(&cfg, &marker, &args.class_path);
    }

    let sinks = Box::new(FileSinkFactory::new(&args.output)?);
    let mut marker = Marker::new(&cfg, fs, launcher, sinks);
    let mut operator = TerminalOperator::stdio();

    info!(
        class = ?args.class_path,
        output = ?args.output,
        host = %cfg.server.host,
        port = cfg.server.port,
        "starting marking"
    );

    match MarkingMode::from_manual_flag(args.manual) {
        MarkingMode::Auto => {
            let report = marker.mark_auto(&args.class_path, &mut operator).await?;
            let failed = report.results.iter().filter(|(_, s)| !s.is_ok()).count();
            info!(
                marked = report.results.len(),
                failed,
                still_pending = report.ledger.len(),
                "automatic marking finished"
            );
        }
        MarkingMode::Manual => {
            marker.mark_manual(&args.class_path, &mut operator).await?;
        }
    }

    Ok(())
}

/// Sink factory for dry runs, which never open a sink.
struct NoSinks;

impl sink::SinkFactory for NoSinks {
    fn open(&mut self, submission: &str, _echo: bool) -> Result<sink::SharedSink> {
        bail!("dry run must not open an output sink (submission {submission})")
    }
}

/// Simple dry-run output: every submission and what would be run.
fn print_dry_run(cfg: &MarkerConfig, marker: &Marker, class_path: &Path) -> Result<()> {
    println!("labmark dry-run");
    println!("  target = {}", cfg.target_name);
    println!("  server = {}:{}", cfg.server.host, cfg.server.port);
    println!(
        "  harness = poll {:?} x {}, grace {:?}",
        cfg.harness.poll_interval, cfg.harness.max_polls, cfg.harness.min_survival
    );
    println!();

    let located = marker.locate_all(class_path)?;
    println!("submissions ({}):", located.len());
    for (submission, record) in located {
        match record {
            Some(record) => {
                let plan = harness::LaunchPlan::resolve(
                    &cfg.languages,
                    record.language,
                    &cfg.target_name,
                    &cfg.server,
                );
                println!("  - {submission}: {}", record.language);
                println!("      file: {:?}", record.source_path(&cfg.target_name));
                match plan {
                    harness::LaunchPlan::Execute { build, run } => {
                        if let Some(build) = build {
                            println!("      build: {build}");
                        }
                        println!("      run: {run}");
                    }
                    harness::LaunchPlan::ManualReview { .. } => {
                        println!("      manual review");
                    }
                }
            }
            None => println!("  - {submission}: {}", harness::ExecStatus::FileNotFound),
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
