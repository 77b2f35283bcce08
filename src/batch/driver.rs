// src/batch/driver.rs

//! Batch driver: runs the classifier over the submissions of one class.
//!
//! Submissions are processed sequentially, one child process at a time.
//! Per-submission failures are recorded as data in a [`FailureLedger`];
//! only infrastructure problems (unreadable class directory, sink that
//! cannot be opened, broken operator input) end a run early.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::batch::ledger::FailureLedger;
use crate::batch::operator::{FailureDecision, Operator};
use crate::config::{MarkerConfig, ServerEndpoint};
use crate::errors::Result;
use crate::fs::{file_name_str, FileSystem};
use crate::harness::{ExecStatus, ExecutionClassifier, ProcessLauncher};
use crate::locate::{locate, SubmissionRecord};
use crate::sink::{self, SharedSink, SinkFactory};

/// Outcome of an automatic run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// First-pass status of every submission, in marking order.
    pub results: Vec<(String, ExecStatus)>,
    /// Failures still pending after the optional retry pass.
    pub ledger: FailureLedger,
}

/// Marks submissions of a class.
pub struct Marker {
    classifier: ExecutionClassifier,
    server: ServerEndpoint,
    target_name: String,
    fs: Arc<dyn FileSystem>,
    launcher: Box<dyn ProcessLauncher>,
    sinks: Box<dyn SinkFactory>,
}

impl Marker {
    pub fn new(
        config: &MarkerConfig,
        fs: Arc<dyn FileSystem>,
        launcher: Box<dyn ProcessLauncher>,
        sinks: Box<dyn SinkFactory>,
    ) -> Self {
        Self {
            classifier: ExecutionClassifier::from_config(config),
            server: config.server.clone(),
            target_name: config.target_name.clone(),
            fs,
            launcher,
            sinks,
        }
    }

    /// Names of the submission directories in `class_path`, sorted.
    ///
    /// Hidden entries (leading `.`) and plain files are skipped.
    pub fn submissions(&self, class_path: &Path) -> Result<Vec<String>> {
        let entries = self
            .fs
            .read_dir(class_path)
            .with_context(|| format!("listing submissions in {:?}", class_path))?;

        Ok(entries
            .iter()
            .filter(|path| self.fs.is_dir(path))
            .filter_map(|path| file_name_str(path))
            .filter(|name| !name.starts_with('.'))
            .map(str::to_string)
            .collect())
    }

    /// Locate the candidate file of every submission without running it.
    pub fn locate_all(&self, class_path: &Path) -> Result<Vec<(String, Option<SubmissionRecord>)>> {
        let mut located = Vec::new();
        for submission in self.submissions(class_path)? {
            let record = locate(self.fs.as_ref(), &class_path.join(&submission), &self.target_name)?;
            located.push((submission, record));
        }
        Ok(located)
    }

    /// Locate, run and classify one submission.
    ///
    /// Opens the submission's sink, and closes it exactly once whatever the
    /// outcome. `echo` mirrors captured output to the terminal.
    pub async fn mark_submission(&mut self, class_path: &Path, submission: &str, echo: bool) -> Result<ExecStatus> {
        let sink = self.sinks.open(submission, echo)?;
        let status = self.run_individual(&class_path.join(submission), &sink).await;

        if let Err(err) = sink::close(&sink) {
            warn!(submission = %submission, error = %err, "failed to close output sink");
        }

        info!(submission = %submission, status = %status, code = status.code(), "submission marked");
        Ok(status)
    }

    async fn run_individual(&mut self, submission_path: &Path, sink: &SharedSink) -> ExecStatus {
        let record = match locate(self.fs.as_ref(), submission_path, &self.target_name) {
            Ok(Some(record)) => record,
            Ok(None) => return self.file_not_found(submission_path, sink),
            Err(err) => {
                warn!(path = ?submission_path, error = %err, "cannot search submission");
                return self.file_not_found(submission_path, sink);
            }
        };

        self.classifier
            .classify(self.launcher.as_mut(), &record, &self.server, sink)
            .await
    }

    fn file_not_found(&self, submission_path: &Path, sink: &SharedSink) -> ExecStatus {
        info!(
            path = ?submission_path,
            target = %self.target_name,
            "no candidate source file found"
        );
        sink::write_message(sink, ExecStatus::FileNotFound.description(), true);
        ExecStatus::FileNotFound
    }

    /// Mark every submission, then offer a retry pass over the failures.
    pub async fn mark_auto(&mut self, class_path: &Path, operator: &mut dyn Operator) -> Result<BatchReport> {
        let submissions = self.submissions(class_path)?;
        let total = submissions.len();
        info!(class = ?class_path, total, "marking submissions automatically");

        let mut report = BatchReport::default();

        for (i, submission) in submissions.iter().enumerate() {
            info!(submission = %submission, "[{}/{}] marking", i + 1, total);
            let status = self.mark_submission(class_path, submission, false).await?;
            if !status.is_ok() {
                report.ledger.record(submission.clone(), status.description());
            }
            report.results.push((submission.clone(), status));
        }

        if report.ledger.is_empty() {
            operator.notify("All submissions executed successfully.")?;
            return Ok(report);
        }

        operator.notify(&failure_report(
            "The following submissions did not execute properly.",
            &report.ledger,
        ))?;
        if operator.confirm("Would you like to manually mark them?")? {
            self.retry(class_path, &mut report.ledger, operator).await?;
        }

        Ok(report)
    }

    /// Let the operator pick submissions one at a time until they stop.
    ///
    /// Returns every classification made, in order.
    pub async fn mark_manual(
        &mut self,
        class_path: &Path,
        operator: &mut dyn Operator,
    ) -> Result<Vec<(String, ExecStatus)>> {
        let submissions = self.submissions(class_path)?;
        let mut history = Vec::new();

        while let Some(i) = operator.select("Please select a submission to mark", &submissions)? {
            let Some(submission) = submissions.get(i) else {
                warn!(index = i, "selection out of range");
                continue;
            };
            operator.notify(&format!("Running code for submission {submission}...."))?;

            let status = self.mark_submission(class_path, submission, true).await?;
            if status.is_ok() {
                operator.notify("Done")?;
            } else {
                operator.notify(status.description())?;
            }
            history.push((submission.clone(), status));
        }

        info!(marked = history.len(), "manual marking stopped");
        Ok(history)
    }

    /// Retry loop over `ledger`.
    ///
    /// A successful re-run removes the entry. Any other outcome replaces
    /// the recorded reason and the operator decides whether to drop it.
    /// Ends when the ledger is empty or the operator stops selecting.
    pub async fn retry(
        &mut self,
        class_path: &Path,
        ledger: &mut FailureLedger,
        operator: &mut dyn Operator,
    ) -> Result<()> {
        while !ledger.is_empty() {
            operator.notify(&failure_report("Remaining submissions for remarking", ledger))?;

            let pending = ledger.pending();
            let Some(i) = operator.select("Please select a submission to continue", &pending)? else {
                info!(remaining = ledger.len(), "retry loop stopped by operator");
                break;
            };
            let Some(submission) = pending.get(i) else {
                warn!(index = i, "selection out of range");
                continue;
            };

            let status = self.mark_submission(class_path, submission, true).await?;
            if status.is_ok() {
                operator.notify("Detected successful execution, removing submission from retry list")?;
                ledger.remove(submission);
                continue;
            }

            ledger.record(submission.clone(), status.description());
            if operator.failure_decision(submission, status)? == FailureDecision::Remove {
                info!(submission = %submission, "removed from retry list by operator");
                ledger.remove(submission);
            }
        }
        Ok(())
    }
}

/// Two-column `zID / Reason` table of the pending failures.
pub fn failure_report(title: &str, ledger: &FailureLedger) -> String {
    let mut out = format!("{title}\nzID \t\t Reason\n");
    for (submission, reason) in ledger.entries() {
        out.push_str(&format!("{submission} \t {reason}\n"));
    }
    out
}
