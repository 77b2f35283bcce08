use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use labmark::harness::{BoxFuture, PollEvent, ProcessHandle, ProcessLauncher};
use labmark::sink::{self, SharedSink};
use tokio::time::{sleep_until, Instant};

/// Behaviour of a scripted process, relative to its spawn time.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Lines printed at the given offsets.
    pub output: Vec<(Duration, String)>,
    /// When the process exits on its own; `None` means never.
    pub exit_after: Option<Duration>,
}

impl Script {
    pub fn exits_after(after: Duration) -> Self {
        Self {
            output: Vec::new(),
            exit_after: Some(after),
        }
    }

    /// Dies the moment it is spawned.
    pub fn crashes() -> Self {
        Self::exits_after(Duration::ZERO)
    }

    /// Never exits unless killed.
    pub fn hangs() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, at: Duration, line: &str) -> Self {
        self.output.push((at, line.to_string()));
        self
    }
}

/// Counters shared between a scripted process and the test.
#[derive(Debug, Default)]
pub struct ProcessStats {
    polls: AtomicUsize,
    kills: AtomicUsize,
}

impl ProcessStats {
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }
}

/// A process that follows a [`Script`] on the tokio clock.
///
/// Meant for `#[tokio::test(start_paused = true)]`: every wait is a
/// `sleep_until`, so the paused clock auto-advances and timings are exact.
///
/// An exit that coincides with the end of a poll window is observed by the
/// next poll, the way a real timeout fires before a late exit is seen.
pub struct ScriptedProcess {
    spawned_at: Instant,
    exit_at: Option<Instant>,
    output: VecDeque<(Instant, String)>,
    sink: SharedSink,
    alive: bool,
    exited_at: Option<Instant>,
    stats: Arc<ProcessStats>,
}

impl ScriptedProcess {
    pub fn start(script: Script, sink: SharedSink) -> (Self, Arc<ProcessStats>) {
        let spawned_at = Instant::now();
        let mut output: Vec<(Instant, String)> = script
            .output
            .into_iter()
            .map(|(at, line)| (spawned_at + at, line))
            .collect();
        output.sort_by_key(|(at, _)| *at);

        let stats = Arc::new(ProcessStats::default());
        let process = Self {
            spawned_at,
            exit_at: script.exit_after.map(|d| spawned_at + d),
            output: output.into(),
            sink,
            alive: true,
            exited_at: None,
            stats: Arc::clone(&stats),
        };
        (process, stats)
    }

    async fn poll_for(&mut self, timeout: Duration) -> PollEvent {
        self.stats.polls.fetch_add(1, Ordering::SeqCst);
        if !self.alive {
            return PollEvent::Terminated;
        }

        let now = Instant::now();
        if let Some(exit_at) = self.exit_at {
            if exit_at <= now {
                self.exit(exit_at);
                return PollEvent::Terminated;
            }
        }

        let deadline = now + timeout;

        let next_line_due = match (self.output.front(), self.exit_at) {
            (Some((at, _)), Some(exit_at)) => *at < deadline && *at <= exit_at,
            (Some((at, _)), None) => *at < deadline,
            (None, _) => false,
        };
        if next_line_due {
            if let Some((at, line)) = self.output.pop_front() {
                sleep_until(at).await;
                sink::forward_line(&self.sink, &line);
                if let Some(exit_at) = self.exit_at.filter(|exit_at| *exit_at <= at) {
                    self.exit(exit_at);
                }
                return PollEvent::OutputReceived(line);
            }
        }

        if let Some(exit_at) = self.exit_at {
            if exit_at < deadline {
                sleep_until(exit_at).await;
                self.exit(exit_at);
                return PollEvent::Terminated;
            }
        }

        sleep_until(deadline).await;
        PollEvent::NoNewOutput
    }

    fn exit(&mut self, at: Instant) {
        self.alive = false;
        self.exited_at = Some(at);
    }
}

impl ProcessHandle for ScriptedProcess {
    fn poll(&mut self, timeout: Duration) -> BoxFuture<'_, PollEvent> {
        Box::pin(self.poll_for(timeout))
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn kill(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.stats.kills.fetch_add(1, Ordering::SeqCst);
            self.alive = false;
        })
    }

    fn elapsed(&self) -> Duration {
        self.spawned_at.elapsed()
    }

    fn exited_at(&self) -> Option<Instant> {
        self.exited_at
    }
}

/// One `spawn` call seen by a [`ScriptedLauncher`].
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    pub command: String,
    pub cwd: PathBuf,
    pub stats: Arc<ProcessStats>,
}

/// Everything a [`ScriptedLauncher`] was asked to do.
#[derive(Debug, Default)]
pub struct LaunchLog {
    pub builds: Vec<(String, PathBuf)>,
    pub spawns: Vec<SpawnRecord>,
}

/// Launcher that hands out [`ScriptedProcess`]es.
///
/// Scripts are keyed by a path component of the working directory (usually
/// the submission name). Each key holds a queue: every spawn takes the next
/// script, and the last one repeats.
pub struct ScriptedLauncher {
    scripts: HashMap<String, VecDeque<Script>>,
    default_script: Script,
    log: Arc<Mutex<LaunchLog>>,
}

impl ScriptedLauncher {
    /// Unknown submissions crash immediately.
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            default_script: Script::crashes(),
            log: Arc::new(Mutex::new(LaunchLog::default())),
        }
    }

    pub fn with_default(mut self, script: Script) -> Self {
        self.default_script = script;
        self
    }

    pub fn with_script(self, key: &str, script: Script) -> Self {
        self.with_scripts(key, vec![script])
    }

    pub fn with_scripts(mut self, key: &str, scripts: Vec<Script>) -> Self {
        self.scripts.insert(key.to_string(), scripts.into());
        self
    }

    /// Shared handle on the launch log, usable after the launcher moved.
    pub fn log(&self) -> Arc<Mutex<LaunchLog>> {
        Arc::clone(&self.log)
    }

    fn next_script(&mut self, cwd: &Path) -> Script {
        let key = self
            .scripts
            .keys()
            .find(|key| cwd.components().any(|c| c.as_os_str() == key.as_str()))
            .cloned();

        match key.and_then(|k| self.scripts.get_mut(&k)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => self.default_script.clone(),
        }
    }
}

impl Default for ScriptedLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn build<'a>(&'a mut self, command: &'a str, cwd: &'a Path) -> BoxFuture<'a, ()> {
        self.log
            .lock()
            .unwrap()
            .builds
            .push((command.to_string(), cwd.to_path_buf()));
        Box::pin(async {})
    }

    fn spawn(&mut self, command: &str, cwd: &Path, sink: SharedSink) -> Box<dyn ProcessHandle> {
        let script = self.next_script(cwd);
        let (process, stats) = ScriptedProcess::start(script, sink);
        self.log.lock().unwrap().spawns.push(SpawnRecord {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            stats,
        });
        Box::new(process)
    }
}
