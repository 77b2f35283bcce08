// src/harness/mod.rs

//! Submission execution harness.
//!
//! - [`process`] owns a spawned child and exposes bounded, non-blocking
//!   polling of its output ([`ChildProcess`], [`ShellLauncher`]).
//! - [`plan`] turns a located submission into concrete shell commands.
//! - [`classifier`] drives one process through the polling state machine
//!   and maps what it observes onto an [`ExecStatus`].
//! - [`status`] is the outcome taxonomy.
//!
//! The classifier only talks to the [`ProcessLauncher`] and
//! [`ProcessHandle`] traits, so tests can replace real processes with
//! scripted ones and drive them on a paused clock.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;

use crate::sink::SharedSink;

pub mod classifier;
pub mod plan;
pub mod process;
pub mod status;

pub use classifier::{ExecutionClassifier, Phase};
pub use plan::LaunchPlan;
pub use process::{ChildProcess, ShellLauncher};
pub use status::ExecStatus;

/// Boxed future returned by the harness traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of one bounded poll of a child's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// The timeout expired without new output; the child is still running.
    NoNewOutput,
    /// A line was captured (and already forwarded to the sink).
    OutputReceived(String),
    /// The child has exited (or never started). Liveness is now false.
    Terminated,
}

/// One live or recently-live child process.
pub trait ProcessHandle: Send {
    /// Wait at most `timeout` for output or termination.
    fn poll(&mut self, timeout: Duration) -> BoxFuture<'_, PollEvent>;

    /// Real process state as of the last poll, including polls that
    /// returned output.
    fn is_alive(&self) -> bool;

    /// Force-terminate the child. Idempotent and infallible for the caller.
    fn kill(&mut self) -> BoxFuture<'_, ()>;

    /// Time since the child was spawned.
    fn elapsed(&self) -> Duration;

    /// When the child was seen exiting on its own. `None` while it runs,
    /// after a kill, or if it never started.
    fn exited_at(&self) -> Option<Instant>;
}

/// Starts processes for the classifier.
///
/// Production code uses [`ShellLauncher`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessLauncher: Send {
    /// Run a build step to completion. Its outcome is not observed: a failed
    /// build simply leaves nothing runnable behind.
    fn build<'a>(&'a mut self, command: &'a str, cwd: &'a Path) -> BoxFuture<'a, ()>;

    /// Spawn `command` in `cwd`, forwarding its output to `sink`.
    ///
    /// Never fails: a process that cannot be started is reported as
    /// terminated by the first poll of the returned handle.
    fn spawn(&mut self, command: &str, cwd: &Path, sink: SharedSink) -> Box<dyn ProcessHandle>;
}
