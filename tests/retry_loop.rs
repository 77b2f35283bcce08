// tests/retry_loop.rs

mod common;
use crate::common::builders::ClassDirBuilder;
use crate::common::{init_tracing, scripted_marker};

use std::error::Error;
use std::time::Duration;

use labmark::batch::FailureLedger;
use labmark::config::MarkerConfig;
use labmark::harness::ExecStatus;
use labmark_test_utils::fake_process::{Script, ScriptedLauncher};
use labmark_test_utils::recording_sink::open_count;
use labmark_test_utils::scripted_operator::{Answer, ScriptedOperator};

type TestResult = Result<(), Box<dyn Error>>;

fn ledger(entries: &[(&str, ExecStatus)]) -> FailureLedger {
    let mut ledger = FailureLedger::new();
    for (submission, status) in entries {
        ledger.record(*submission, status.description());
    }
    ledger
}

#[tokio::test(start_paused = true)]
async fn successful_retry_removes_entry_without_asking() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path()).file("alice/PingClient.py", "");
    let launcher = ScriptedLauncher::new().with_script("alice", Script::exits_after(Duration::from_secs(3)));
    let mut t = scripted_marker(&MarkerConfig::default(), launcher);
    let mut pending = ledger(&[("alice", ExecStatus::Timeout)]);
    let mut operator = ScriptedOperator::new(vec![Answer::Pick("alice".to_string())]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert!(pending.is_empty());
    assert!(operator.decisions_asked.is_empty());
    assert_eq!(
        operator.notifications.last().map(String::as_str),
        Some("Detected successful execution, removing submission from retry list")
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_retry_updates_reason_and_continue_keeps_it() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path()).file("bob/PingClient.py", "");
    let launcher = ScriptedLauncher::new().with_script("bob", Script::exits_after(Duration::from_millis(700)));
    let mut t = scripted_marker(&MarkerConfig::default(), launcher);
    let mut pending = ledger(&[("bob", ExecStatus::ExecutionFailed)]);
    let mut operator = ScriptedOperator::new(vec![
        Answer::Pick("bob".to_string()),
        Answer::Continue,
        Answer::Stop,
    ]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert_eq!(pending.pending(), vec!["bob"]);
    assert_eq!(pending.reason("bob"), Some("Unexpected termination"));
    assert_eq!(
        operator.decisions_asked,
        vec![("bob".to_string(), ExecStatus::UnexpectedTermination)]
    );
    assert_eq!(operator.presented.len(), 2);
    assert_eq!(operator.remaining(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn remove_decision_drops_only_that_submission() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path())
        .file("carol/PingClient.py", "")
        .file("dave/PingClient.py", "");
    let launcher = ScriptedLauncher::new().with_default(Script::hangs());
    let mut t = scripted_marker(&MarkerConfig::default(), launcher);
    let mut pending = ledger(&[
        ("carol", ExecStatus::Timeout),
        ("dave", ExecStatus::ExecutionFailed),
    ]);
    let mut operator = ScriptedOperator::new(vec![
        Answer::Pick("dave".to_string()),
        Answer::Remove,
        Answer::Stop,
    ]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert_eq!(pending.pending(), vec!["carol"]);
    assert_eq!(pending.reason("carol"), Some("Timeout"));
    assert_eq!(
        operator.presented,
        vec![
            vec!["carol".to_string(), "dave".to_string()],
            vec!["carol".to_string()],
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stopping_immediately_runs_nothing() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path()).file("erin/PingClient.py", "");
    let mut t = scripted_marker(&MarkerConfig::default(), ScriptedLauncher::new());
    let before = ledger(&[("erin", ExecStatus::ExecutionFailed)]);
    let mut pending = before.clone();
    let mut operator = ScriptedOperator::new(vec![Answer::Stop]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert_eq!(pending, before);
    assert!(t.launches.lock().unwrap().spawns.is_empty());
    assert_eq!(open_count(&t.sinks, "erin"), 0);
    assert_eq!(operator.notifications.len(), 1, "only the remaining-list report");
    assert!(operator.notifications[0].starts_with("Remaining submissions for remarking"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn out_of_range_selection_is_ignored() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path()).file("frank/PingClient.py", "");
    let mut t = scripted_marker(&MarkerConfig::default(), ScriptedLauncher::new());
    let mut pending = ledger(&[("frank", ExecStatus::Timeout)]);
    let mut operator = ScriptedOperator::new(vec![Answer::PickIndex(7), Answer::Stop]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert_eq!(pending.pending(), vec!["frank"]);
    assert_eq!(operator.presented.len(), 2);
    assert!(t.launches.lock().unwrap().spawns.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_keep_the_newest_reason() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path()).file("gina/PingClient.py", "");
    let launcher = ScriptedLauncher::new().with_scripts(
        "gina",
        vec![
            Script::exits_after(Duration::from_millis(500)),
            Script::hangs(),
            Script::exits_after(Duration::from_secs(10)),
        ],
    );
    let mut t = scripted_marker(&MarkerConfig::default(), launcher);
    let mut pending = ledger(&[("gina", ExecStatus::ExecutionFailed)]);
    let mut operator = ScriptedOperator::new(vec![
        Answer::Pick("gina".to_string()),
        Answer::Continue,
        Answer::Pick("gina".to_string()),
        Answer::Continue,
        Answer::Stop,
    ]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert_eq!(pending.reason("gina"), Some("Timeout"));
    assert_eq!(
        operator.decisions_asked,
        vec![
            ("gina".to_string(), ExecStatus::UnexpectedTermination),
            ("gina".to_string(), ExecStatus::Timeout),
        ]
    );
    assert_eq!(open_count(&t.sinks, "gina"), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn submission_deleted_since_first_pass_is_file_not_found() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let class = ClassDirBuilder::new(dir.path()).dir("hank");
    let mut t = scripted_marker(&MarkerConfig::default(), ScriptedLauncher::new());
    let mut pending = ledger(&[("hank", ExecStatus::ExecutionFailed)]);
    let mut operator = ScriptedOperator::new(vec![Answer::Pick("hank".to_string()), Answer::Remove]);

    t.marker.retry(class.path(), &mut pending, &mut operator).await?;

    assert!(pending.is_empty());
    assert_eq!(
        operator.decisions_asked,
        vec![("hank".to_string(), ExecStatus::FileNotFound)]
    );
    Ok(())
}
