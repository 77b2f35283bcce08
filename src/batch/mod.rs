// src/batch/mod.rs

//! Batch marking: automatic and manual modes plus the retry loop.
//!
//! - [`driver`] holds [`Marker`], which ties locator, classifier and sinks
//!   together for a whole class directory.
//! - [`ledger`] is the [`FailureLedger`] of submissions awaiting a
//!   successful re-run.
//! - [`operator`] abstracts the interactive prompts.

pub mod driver;
pub mod ledger;
pub mod operator;

pub use driver::{failure_report, BatchReport, Marker};
pub use ledger::FailureLedger;
pub use operator::{FailureDecision, Operator, TerminalOperator};
