// src/harness/status.rs

use std::fmt;

/// Outcome of classifying one submission.
///
/// Every variant pairs a fixed integer code with a fixed description. `0`
/// is success; every other code marks the submission for the retry ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecStatus {
    /// Stayed alive past the grace period and then exited on its own.
    /// Also used for languages that are routed to manual review.
    Ok,
    /// Already dead at the first liveness check (crash or failed launch).
    ExecutionFailed,
    /// No candidate source file in the submission.
    FileNotFound,
    /// Exited after the first check but before the grace period ended.
    UnexpectedTermination,
    /// Still alive when the poll budget ran out; force-killed.
    Timeout,
}

/// Static lookup table: code → (status, description).
const TABLE: [(i32, ExecStatus, &str); 5] = [
    (0, ExecStatus::Ok, "OK"),
    (-1, ExecStatus::ExecutionFailed, "Execution failed"),
    (-2, ExecStatus::FileNotFound, "File not found"),
    (-3, ExecStatus::UnexpectedTermination, "Unexpected termination"),
    (-4, ExecStatus::Timeout, "Timeout"),
];

impl ExecStatus {
    pub const ALL: [ExecStatus; 5] = [
        ExecStatus::Ok,
        ExecStatus::ExecutionFailed,
        ExecStatus::FileNotFound,
        ExecStatus::UnexpectedTermination,
        ExecStatus::Timeout,
    ];

    fn entry(self) -> &'static (i32, ExecStatus, &'static str) {
        // Variants are listed in declaration order.
        &TABLE[self as usize]
    }

    pub fn code(self) -> i32 {
        self.entry().0
    }

    pub fn description(self) -> &'static str {
        self.entry().2
    }

    pub fn is_ok(self) -> bool {
        self == ExecStatus::Ok
    }

    pub fn from_code(code: i32) -> Option<Self> {
        TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, status, _)| *status)
    }

    /// Description for a raw code, as reported by the batch layer.
    pub fn description_for(code: i32) -> Option<&'static str> {
        Self::from_code(code).map(Self::description)
    }
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
