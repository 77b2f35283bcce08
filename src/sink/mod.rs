// src/sink/mod.rs

//! Output sinks: where captured program output and status messages go.
//!
//! - [`OutputSink`] is the line-oriented write interface.
//! - [`SharedSink`] is the handle passed to a process and to the classifier
//!   for one submission. Every write happens under its mutex and covers a
//!   whole line, so captured output and status messages never interleave
//!   mid-line.
//! - [`SinkFactory`] opens one sink per submission; [`file`] holds the
//!   production implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use tracing::warn;

pub mod file;

pub use file::{FileSink, FileSinkFactory};

/// Destination for one submission's output.
pub trait OutputSink: Send {
    /// Write one captured line of program output.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Write a synthetic status message.
    ///
    /// With `suppress_echo`, the message is recorded but never echoed to the
    /// terminal, even if the sink echoes captured output.
    fn write_message(&mut self, message: &str, suppress_echo: bool) -> Result<()>;

    /// Flush and release the sink. Called exactly once per submission.
    fn close(&mut self) -> Result<()>;
}

/// Sink shared between a process handle and its classifier.
pub type SharedSink = Arc<Mutex<dyn OutputSink>>;

/// Wrap a concrete sink into a [`SharedSink`].
pub fn shared<S: OutputSink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Opens a fresh sink for a submission.
pub trait SinkFactory: Send {
    /// `echo` selects whether captured output is mirrored to the terminal.
    fn open(&mut self, submission: &str, echo: bool) -> Result<SharedSink>;
}

fn lock(sink: &SharedSink) -> MutexGuard<'_, dyn OutputSink + 'static> {
    // A panic while holding the lock leaves at worst a partially written
    // line behind; keep writing.
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forward a captured line, logging (not propagating) sink failures.
pub fn forward_line(sink: &SharedSink, line: &str) {
    if let Err(err) = lock(sink).write_line(line) {
        warn!(error = %err, "failed to write captured output line");
    }
}

/// Write a status message, logging (not propagating) sink failures.
pub fn write_message(sink: &SharedSink, message: &str, suppress_echo: bool) {
    if let Err(err) = lock(sink).write_message(message, suppress_echo) {
        warn!(error = %err, "failed to write status message");
    }
}

/// Close the sink at the end of a submission.
pub fn close(sink: &SharedSink) -> Result<()> {
    lock(sink).close()
}
