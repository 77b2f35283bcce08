// tests/terminal_operator.rs

use std::io::Cursor;

use anyhow::Result;
use labmark::batch::{FailureDecision, Operator, TerminalOperator};
use labmark::harness::ExecStatus;

fn operator(input: &str) -> TerminalOperator<Cursor<Vec<u8>>, Vec<u8>> {
    TerminalOperator::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn printed(op: TerminalOperator<Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8(op.into_output()).expect("utf-8 output")
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn select_lists_items_and_returns_index() -> Result<()> {
    let mut op = operator("1\n");
    let choice = op.select("Please select a submission to mark", &items(&["alice", "bob"]))?;

    assert_eq!(choice, Some(1));
    let out = printed(op);
    assert!(out.contains("Please select a submission to mark"));
    assert!(out.contains("[0] alice"));
    assert!(out.contains("[1] bob"));
    Ok(())
}

#[test]
fn select_reprompts_on_invalid_input() -> Result<()> {
    let mut op = operator("7\nbob\n  0  \n");
    let choice = op.select("pick", &items(&["alice", "bob"]))?;

    assert_eq!(choice, Some(0));
    let out = printed(op);
    assert!(out.contains("Invalid selection: '7'"));
    assert!(out.contains("Invalid selection: 'bob'"));
    Ok(())
}

#[test]
fn select_stops_on_q_or_end_of_input() -> Result<()> {
    assert_eq!(operator("q\n").select("pick", &items(&["alice"]))?, None);
    assert_eq!(operator("Q\n").select("pick", &items(&["alice"]))?, None);
    assert_eq!(operator("").select("pick", &items(&["alice"]))?, None);
    Ok(())
}

#[test]
fn select_on_empty_list_asks_nothing() -> Result<()> {
    let mut op = operator("0\n");
    assert_eq!(op.select("pick", &[])?, None);
    assert!(printed(op).is_empty());
    Ok(())
}

#[test]
fn confirm_accepts_y_and_n_only() -> Result<()> {
    assert!(operator("y\n").confirm("Would you like to manually mark them?")?);
    assert!(operator(" Y \n").confirm("again?")?);
    assert!(!operator("n\n").confirm("again?")?);
    assert!(operator("maybe\nyes\ny\n").confirm("again?")?);
    assert!(!operator("").confirm("again?")?);
    Ok(())
}

#[test]
fn failure_decision_defaults_to_continue() -> Result<()> {
    let mut op = operator("r\n");
    assert_eq!(op.failure_decision("carol", ExecStatus::Timeout)?, FailureDecision::Remove);
    assert!(printed(op).contains("carol: Timeout. [R]emove, [C]ontinue: "));

    assert_eq!(
        operator("c\n").failure_decision("carol", ExecStatus::Timeout)?,
        FailureDecision::Continue
    );
    assert_eq!(
        operator("whatever\n").failure_decision("carol", ExecStatus::Timeout)?,
        FailureDecision::Continue
    );
    assert_eq!(
        operator("").failure_decision("carol", ExecStatus::Timeout)?,
        FailureDecision::Continue
    );
    Ok(())
}

#[test]
fn notify_prints_one_line() -> Result<()> {
    let mut op = operator("");
    op.notify("All submissions executed successfully.")?;
    assert_eq!(printed(op), "All submissions executed successfully.\n");
    Ok(())
}
