use std::collections::VecDeque;

use anyhow::Result;
use labmark::batch::{FailureDecision, Operator};
use labmark::harness::ExecStatus;

/// One scripted operator answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the item with this name from the presented list.
    Pick(String),
    /// Pick by position.
    PickIndex(usize),
    /// Stop the selection loop.
    Stop,
    Yes,
    No,
    Remove,
    Continue,
}

/// Operator that replays a fixed list of answers.
///
/// When the script runs out, selections stop, confirmations are "no" and
/// failure decisions are "continue".
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<Answer>,
    /// Every `notify` message, in order.
    pub notifications: Vec<String>,
    /// Every list presented by `select`.
    pub presented: Vec<Vec<String>>,
    /// Every `failure_decision` question: (submission, status).
    pub decisions_asked: Vec<(String, ExecStatus)>,
}

impl ScriptedOperator {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn select(&mut self, _prompt: &str, items: &[String]) -> Result<Option<usize>> {
        self.presented.push(items.to_vec());
        Ok(match self.answers.pop_front() {
            Some(Answer::Pick(name)) => items.iter().position(|i| *i == name),
            Some(Answer::PickIndex(i)) => Some(i),
            _ => None,
        })
    }

    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(matches!(self.answers.pop_front(), Some(Answer::Yes)))
    }

    fn failure_decision(&mut self, submission: &str, status: ExecStatus) -> Result<FailureDecision> {
        self.decisions_asked.push((submission.to_string(), status));
        Ok(match self.answers.pop_front() {
            Some(Answer::Remove) => FailureDecision::Remove,
            _ => FailureDecision::Continue,
        })
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.notifications.push(message.to_string());
        Ok(())
    }
}
