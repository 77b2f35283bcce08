// src/harness/classifier.rs

//! Execution classifier.
//!
//! Drives one [`ProcessHandle`] through the polling state machine
//!
//! ```text
//! Starting ──(dead after first window)──> ExecutionFailed
//!    │
//!    v
//! Running ──(Terminated)──> NaturalExit ──> UnexpectedTermination | Ok
//!    │
//!    └──(window counter > max_polls)──> TimedOut ──(kill)──> Timeout
//! ```
//!
//! Time is cut into windows of `poll_interval` measured from the spawn.
//! Output inside a window is forwarded without ending it, so a hung
//! submission is killed `(max_polls + 2) * poll_interval` after spawn no
//! matter how much it prints.

use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{HarnessSettings, LanguageSection, MarkerConfig, ServerEndpoint};
use crate::harness::plan::{manual_review_message, LaunchPlan};
use crate::harness::{ExecStatus, PollEvent, ProcessHandle, ProcessLauncher};
use crate::locate::SubmissionRecord;
use crate::sink::{self, SharedSink};

/// States of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Spawned; waiting for the first liveness check.
    Starting,
    /// Observed alive at least once; `polls` loop windows done so far.
    Running { polls: u32 },
    /// The process exited on its own.
    NaturalExit,
    /// The poll budget ran out while the process was alive.
    TimedOut,
}

/// Classifies submissions according to the harness settings.
#[derive(Debug, Clone)]
pub struct ExecutionClassifier {
    settings: HarnessSettings,
    languages: LanguageSection,
    target_name: String,
}

impl ExecutionClassifier {
    pub fn new(settings: HarnessSettings, languages: LanguageSection, target_name: impl Into<String>) -> Self {
        Self {
            settings,
            languages,
            target_name: target_name.into(),
        }
    }

    pub fn from_config(cfg: &MarkerConfig) -> Self {
        Self::new(cfg.harness, cfg.languages.clone(), cfg.target_name.clone())
    }

    /// Run the located submission and classify what happens.
    ///
    /// Never fails: every way a submission can go wrong is an
    /// [`ExecStatus`]. The caller owns `sink` and closes it afterwards.
    pub async fn classify(
        &self,
        launcher: &mut dyn ProcessLauncher,
        record: &SubmissionRecord,
        server: &ServerEndpoint,
        sink: &SharedSink,
    ) -> ExecStatus {
        let plan = LaunchPlan::resolve(&self.languages, record.language, &self.target_name, server);

        let (build, run) = match plan {
            LaunchPlan::ManualReview { language } => {
                warn!(
                    dir = ?record.dir,
                    %language,
                    "no run command for language; skipping evaluation"
                );
                sink::write_message(sink, &manual_review_message(language), false);
                return ExecStatus::Ok;
            }
            LaunchPlan::Execute { build, run } => (build, run),
        };

        if let Some(build) = build {
            launcher.build(&build, &record.dir).await;
        }

        let mut process = launcher.spawn(&run, &record.dir, sink.clone());
        let started = Instant::now();

        let status = self.drive(process.as_mut(), started).await;

        info!(
            dir = ?record.dir,
            language = %record.language,
            status = %status,
            code = status.code(),
            elapsed_ms = process.elapsed().as_millis() as u64,
            "classified submission"
        );
        status
    }

    /// Poll `process` until it exits or the poll budget is spent.
    ///
    /// `started` is the spawn timestamp the grace period is measured from.
    pub async fn drive(&self, process: &mut dyn ProcessHandle, started: Instant) -> ExecStatus {
        let interval = self.settings.poll_interval;
        let mut phase = Phase::Starting;

        loop {
            trace!(?phase, "classifier step");
            phase = match phase {
                Phase::Starting => {
                    if !poll_window(process, started + interval).await {
                        debug!("process dead at first liveness check");
                        return ExecStatus::ExecutionFailed;
                    }
                    Phase::Running { polls: 0 }
                }

                Phase::Running { polls } => {
                    let window_end = started + interval.saturating_mul(polls.saturating_add(2));
                    if !poll_window(process, window_end).await {
                        Phase::NaturalExit
                    } else if polls + 1 > self.settings.max_polls {
                        Phase::TimedOut
                    } else {
                        Phase::Running { polls: polls + 1 }
                    }
                }

                Phase::NaturalExit => {
                    let survived = process
                        .exited_at()
                        .unwrap_or_else(Instant::now)
                        .saturating_duration_since(started);
                    debug!(survived_ms = survived.as_millis() as u64, "process exited");
                    return if survived < self.settings.min_survival {
                        ExecStatus::UnexpectedTermination
                    } else {
                        ExecStatus::Ok
                    };
                }

                Phase::TimedOut => {
                    debug!(max_polls = self.settings.max_polls, "poll budget exhausted; killing process");
                    process.kill().await;
                    return ExecStatus::Timeout;
                }
            };
        }
    }
}

/// Poll until `window_end`, letting output through as it arrives.
/// Returns whether the process is still alive when the window closes.
async fn poll_window(process: &mut dyn ProcessHandle, window_end: Instant) -> bool {
    loop {
        let remaining = window_end.saturating_duration_since(Instant::now());
        match process.poll(remaining).await {
            PollEvent::Terminated => return false,
            PollEvent::OutputReceived(_) if Instant::now() < window_end => {}
            PollEvent::OutputReceived(_) | PollEvent::NoNewOutput => return process.is_alive(),
        }
    }
}
