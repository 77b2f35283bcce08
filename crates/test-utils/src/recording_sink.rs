use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use labmark::sink::{shared, OutputSink, SharedSink, SinkFactory};

/// One write received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEntry {
    Line(String),
    Message { text: String, suppress_echo: bool },
}

/// What one sink saw during its lifetime.
#[derive(Debug, Clone, Default)]
pub struct SinkRecord {
    pub entries: Vec<SinkEntry>,
    pub echo: bool,
    pub closes: usize,
}

impl SinkRecord {
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                SinkEntry::Line(l) => Some(l.clone()),
                SinkEntry::Message { .. } => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                SinkEntry::Message { text, .. } => Some(text.clone()),
                SinkEntry::Line(_) => None,
            })
            .collect()
    }
}

/// In-memory sink; rejects writes after `close` like the file sink does.
pub struct RecordingSink {
    record: Arc<Mutex<SinkRecord>>,
}

impl RecordingSink {
    pub fn new(echo: bool) -> (Self, Arc<Mutex<SinkRecord>>) {
        let record = Arc::new(Mutex::new(SinkRecord {
            echo,
            ..SinkRecord::default()
        }));
        (
            Self {
                record: Arc::clone(&record),
            },
            record,
        )
    }

    fn push(&mut self, entry: SinkEntry) -> Result<()> {
        let mut record = self.record.lock().unwrap();
        if record.closes > 0 {
            return Err(anyhow!("write after close: {:?}", entry));
        }
        record.entries.push(entry);
        Ok(())
    }
}

impl OutputSink for RecordingSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.push(SinkEntry::Line(line.to_string()))
    }

    fn write_message(&mut self, message: &str, suppress_echo: bool) -> Result<()> {
        self.push(SinkEntry::Message {
            text: message.to_string(),
            suppress_echo,
        })
    }

    fn close(&mut self) -> Result<()> {
        self.record.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Every sink opened by a [`RecordingSinkFactory`], per submission.
///
/// A submission marked twice (retry) has two records.
pub type SinkLog = Arc<Mutex<BTreeMap<String, Vec<Arc<Mutex<SinkRecord>>>>>>;

/// Factory handing out [`RecordingSink`]s.
#[derive(Default)]
pub struct RecordingSinkFactory {
    log: SinkLog,
}

impl RecordingSinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> SinkLog {
        Arc::clone(&self.log)
    }
}

impl SinkFactory for RecordingSinkFactory {
    fn open(&mut self, submission: &str, echo: bool) -> Result<SharedSink> {
        let (sink, record) = RecordingSink::new(echo);
        self.log
            .lock()
            .unwrap()
            .entry(submission.to_string())
            .or_default()
            .push(record);
        Ok(shared(sink))
    }
}

/// Snapshot of the most recent sink opened for `submission`.
pub fn last_record(log: &SinkLog, submission: &str) -> Option<SinkRecord> {
    let log = log.lock().unwrap();
    let record = log.get(submission)?.last()?;
    let snapshot = record.lock().unwrap().clone();
    Some(snapshot)
}

/// Number of sinks opened for `submission`.
pub fn open_count(log: &SinkLog, submission: &str) -> usize {
    log.lock()
        .unwrap()
        .get(submission)
        .map(Vec::len)
        .unwrap_or(0)
}
