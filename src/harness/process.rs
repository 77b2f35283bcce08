// src/harness/process.rs

//! Real child processes.
//!
//! Output of the child is read by two background tasks (stdout and stderr)
//! and handed to the owning [`ChildProcess`] over an mpsc channel. Lines
//! only reach the sink from inside [`ChildProcess::poll`], so the sink sees
//! captured output and classifier messages strictly in program order.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::HarnessSettings;
use crate::harness::{BoxFuture, PollEvent, ProcessHandle, ProcessLauncher};
use crate::sink::{self, SharedSink};

/// Buffered lines between the reader tasks and the poller.
const LINE_BUFFER: usize = 256;

/// Build a shell command appropriate for the platform.
fn shell_command(script: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(script);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    }
}

/// `exec` the program on unix so that killing the child kills the
/// submission itself rather than an intermediate shell.
fn run_script(command: &str) -> String {
    if cfg!(windows) {
        command.to_string()
    } else {
        format!("exec {command}")
    }
}

/// A spawned submission process.
pub struct ChildProcess {
    command: String,
    /// `None` if the process could not be started.
    child: Option<Child>,
    /// `None` once both output pipes are closed (or after kill).
    lines: Option<mpsc::Receiver<String>>,
    sink: SharedSink,
    alive: bool,
    spawned_at: Instant,
    /// When the exit was first observed, before any draining.
    exited_at: Option<Instant>,
    drain_grace: Duration,
}

impl ChildProcess {
    /// Launch `command` in `cwd` and start capturing its output.
    ///
    /// A launch failure is logged and produces a handle that is already
    /// dead; the first poll reports [`PollEvent::Terminated`].
    pub fn spawn(command: &str, cwd: &Path, sink: SharedSink, drain_grace: Duration) -> Self {
        let spawned_at = Instant::now();

        let mut cmd = shell_command(&run_script(command));
        cmd.current_dir(cwd)
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let (child, lines) = match cmd.spawn() {
            Ok(mut child) => {
                info!(cmd = %command, cwd = ?cwd, pid = ?child.id(), "spawned submission process");

                let (tx, rx) = mpsc::channel::<String>(LINE_BUFFER);
                if let Some(stdout) = child.stdout.take() {
                    spawn_line_reader(stdout, tx.clone(), "stdout");
                }
                if let Some(stderr) = child.stderr.take() {
                    spawn_line_reader(stderr, tx, "stderr");
                }
                (Some(child), Some(rx))
            }
            Err(err) => {
                warn!(cmd = %command, cwd = ?cwd, error = %err, "failed to spawn submission process");
                (None, None)
            }
        };

        Self {
            command: command.to_string(),
            alive: child.is_some(),
            child,
            lines,
            sink,
            spawned_at,
            exited_at: None,
            drain_grace,
        }
    }

    async fn poll_for(&mut self, timeout: Duration) -> PollEvent {
        if !self.alive {
            // Exit already seen (or never started): hand over what is left.
            self.drain().await;
            return PollEvent::Terminated;
        }

        let deadline = Instant::now() + timeout;

        loop {
            let wake = tokio::select! {
                biased;
                line = next_line(&mut self.lines) => Wake::Line(line),
                status = wait_exit(&mut self.child) => Wake::Exited(status),
                _ = sleep_until(deadline) => Wake::Deadline,
            };

            match wake {
                Wake::Line(Some(line)) => {
                    sink::forward_line(&self.sink, &line);
                    self.check_exit();
                    return PollEvent::OutputReceived(line);
                }
                // Both pipes closed: keep waiting on the child itself.
                Wake::Line(None) => self.lines = None,
                Wake::Exited(status) => {
                    self.record_exit(status);
                    self.drain().await;
                    return PollEvent::Terminated;
                }
                Wake::Deadline => return PollEvent::NoNewOutput,
            }
        }
    }

    /// Non-blocking exit check so `is_alive` stays accurate after a poll
    /// that returned output.
    fn check_exit(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(status)) => self.record_exit(Ok(status)),
            Ok(None) => {}
            Err(err) => self.record_exit(Err(err)),
        }
    }

    fn record_exit(&mut self, status: std::io::Result<ExitStatus>) {
        let exited_at = Instant::now();
        match status {
            Ok(status) => debug!(
                cmd = %self.command,
                exit_code = ?status.code(),
                elapsed_ms = exited_at.duration_since(self.spawned_at).as_millis() as u64,
                "submission process exited"
            ),
            Err(err) => warn!(
                cmd = %self.command,
                error = %err,
                "failed to query submission process; treating it as exited"
            ),
        }
        self.alive = false;
        self.exited_at = Some(exited_at);
    }

    /// Forward whatever the reader tasks still hold, bounded by the drain
    /// grace period.
    async fn drain(&mut self) {
        let Some(mut lines) = self.lines.take() else {
            return;
        };
        let deadline = Instant::now() + self.drain_grace;
        while let Ok(Some(line)) = timeout_at(deadline, lines.recv()).await {
            sink::forward_line(&self.sink, &line);
        }
    }

    async fn kill_child(&mut self) {
        if self.alive {
            if let Some(child) = self.child.as_mut() {
                match child.kill().await {
                    Ok(()) => info!(cmd = %self.command, "killed submission process"),
                    // Usually a race with a natural exit; nothing to do.
                    Err(err) => debug!(cmd = %self.command, error = %err, "kill failed"),
                }
            }
        }
        self.alive = false;
        self.lines = None;
    }
}

impl ProcessHandle for ChildProcess {
    fn poll(&mut self, timeout: Duration) -> BoxFuture<'_, PollEvent> {
        Box::pin(self.poll_for(timeout))
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn kill(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(self.kill_child())
    }

    fn elapsed(&self) -> Duration {
        self.spawned_at.elapsed()
    }

    fn exited_at(&self) -> Option<Instant> {
        self.exited_at
    }
}

enum Wake {
    Line(Option<String>),
    Exited(std::io::Result<ExitStatus>),
    Deadline,
}

/// Next captured line; never resolves once the pipes are gone.
async fn next_line(lines: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match lines {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Exit status of the child; never resolves if it was not started.
async fn wait_exit(child: &mut Option<Child>) -> std::io::Result<ExitStatus> {
    match child {
        Some(child) => child.wait().await,
        None => std::future::pending().await,
    }
}

/// Read `stream` line by line and push every line into `tx`.
///
/// Invalid UTF-8 is replaced rather than ending the capture.
fn spawn_line_reader<R>(stream: R, tx: mpsc::Sender<String>, stream_name: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    debug!(stream = stream_name, error = %err, "stopped reading child output");
                    break;
                }
            }
        }
    });
}

/// Production launcher: runs commands through the platform shell.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    drain_grace: Duration,
}

impl ShellLauncher {
    pub fn new(settings: &HarnessSettings) -> Self {
        Self {
            drain_grace: settings.drain_grace,
        }
    }
}

impl ProcessLauncher for ShellLauncher {
    fn build<'a>(&'a mut self, command: &'a str, cwd: &'a Path) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            info!(cmd = %command, cwd = ?cwd, "running build step");

            let mut cmd = shell_command(command);
            cmd.current_dir(cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            match cmd.output().await {
                Ok(output) => {
                    debug!(
                        cmd = %command,
                        exit_code = ?output.status.code(),
                        success = output.status.success(),
                        "build step finished"
                    );
                    for line in String::from_utf8_lossy(&output.stderr).lines() {
                        debug!(cmd = %command, "build stderr: {}", line);
                    }
                }
                Err(err) => {
                    warn!(cmd = %command, error = %err, "failed to run build step");
                }
            }
        })
    }

    fn spawn(&mut self, command: &str, cwd: &Path, sink: SharedSink) -> Box<dyn ProcessHandle> {
        Box::new(ChildProcess::spawn(command, cwd, sink, self.drain_grace))
    }
}
