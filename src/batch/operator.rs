// src/batch/operator.rs

//! Operator interaction.
//!
//! The batch driver never touches the terminal directly; it asks an
//! [`Operator`]. [`TerminalOperator`] is the interactive implementation and
//! works over any `BufRead`/`Write` pair, so it can also be fed from a
//! script or a test buffer.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use anyhow::{Context, Result};

use crate::harness::ExecStatus;

/// What to do with a submission that failed again during a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    /// Accept it as manually verified and drop it from the ledger.
    Remove,
    /// Keep it for another pass.
    Continue,
}

/// Selection provider for the manual and retry loops.
pub trait Operator {
    /// Present `items` and let the operator pick one.
    ///
    /// `None` means the operator wants to stop.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Decide about a submission whose retry did not succeed.
    fn failure_decision(&mut self, submission: &str, status: ExecStatus) -> Result<FailureDecision>;

    /// Informational output (reports, per-submission results).
    fn notify(&mut self, message: &str) -> Result<()>;
}

/// Line-based prompts on a reader/writer pair.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<BufReader<Stdin>, Stdout> {
    /// Operator attached to the process' stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Next trimmed, lower-cased answer; `None` on end of input.
    fn read_answer(&mut self) -> Result<Option<String>> {
        self.output.flush().context("flushing prompt")?;
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("reading operator input")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }

        writeln!(self.output, "{prompt}")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.output, "  [{i}] {item}")?;
        }

        loop {
            write!(self.output, "Select 0-{} (q to stop): ", items.len() - 1)?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            if answer == "q" {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(i) if i < items.len() => return Ok(Some(i)),
                _ => writeln!(self.output, "Invalid selection: '{answer}'")?,
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            write!(self.output, "{prompt} [y]es/[n]o: ")?;
            match self.read_answer()?.as_deref() {
                Some("y") => return Ok(true),
                Some("n") | None => return Ok(false),
                Some(_) => {}
            }
        }
    }

    fn failure_decision(&mut self, submission: &str, status: ExecStatus) -> Result<FailureDecision> {
        write!(
            self.output,
            "{submission}: {}. [R]emove, [C]ontinue: ",
            status.description()
        )?;
        Ok(match self.read_answer()?.as_deref() {
            Some("r") => FailureDecision::Remove,
            _ => FailureDecision::Continue,
        })
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}
