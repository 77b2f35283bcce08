// src/batch/ledger.rs

use std::collections::BTreeMap;

/// Submissions still waiting for a successful classification.
///
/// Maps submission id → description of its most recent failure. Kept
/// ordered so the retry menu lists submissions stably.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLedger {
    entries: BTreeMap<String, String>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the failure reason for `submission`.
    pub fn record(&mut self, submission: impl Into<String>, reason: impl Into<String>) {
        self.entries.insert(submission.into(), reason.into());
    }

    /// Remove `submission`; returns its last reason if it was pending.
    pub fn remove(&mut self, submission: &str) -> Option<String> {
        self.entries.remove(submission)
    }

    pub fn reason(&self, submission: &str) -> Option<&str> {
        self.entries.get(submission).map(String::as_str)
    }

    pub fn contains(&self, submission: &str) -> bool {
        self.entries.contains_key(submission)
    }

    /// Pending submission ids, in order.
    pub fn pending(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
