//! Runs the agent binary and waits for it.
//!
//! The child gets the prepared environment, no arguments and a closed stdin.
//! Stdout and stderr are drained on helper threads so a chatty agent cannot
//! stall on a full pipe while we wait.

use std::{
    io::{self, Read},
    path::Path,
    process::{Command, ExitStatus, Stdio},
    sync::{Arc, Mutex, mpsc},
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};
use wait_timeout::ChildExt;

use super::{environment::AgentEnvironment, issuer::IssueError};

/// Maximum stdout or stderr kept per stream (10 MiB); the rest is discarded.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// How long a killed agent's pipes get to reach EOF before we keep what was
/// read so far. Grandchildren may hold them open indefinitely.
const READER_GRACE: Duration = Duration::from_millis(250);

/// Outcome of an agent run that exited successfully.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Runs `executable` to completion.
///
/// Failure to spawn and any unsuccessful exit are `ProcessFailed`. With a
/// `timeout`, a child still running at the deadline is killed and the run
/// is `ProcessTimedOut`, carrying whatever output arrived before the kill.
pub fn run_agent(
    executable: &Path,
    env: &AgentEnvironment,
    timeout: Option<Duration>,
) -> Result<AgentRun, IssueError> {
    let mut command = Command::new(executable);
    env.apply(&mut command);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let started = Instant::now();
    let mut child = command.spawn().map_err(|err| IssueError::ProcessFailed {
        reason: format!("failed to start {}: {}", executable.display(), err),
        exit_code: None,
        stdout: String::new(),
        stderr: String::new(),
    })?;
    debug!(
        "[agent] started {} (pid {})",
        executable.display(),
        child.id()
    );

    let stdout_reader = OutputReader::spawn(child.stdout.take(), "stdout");
    let stderr_reader = OutputReader::spawn(child.stderr.take(), "stderr");

    let status = match timeout {
        None => child.wait(),
        Some(timeout) => match child.wait_timeout(timeout) {
            Ok(Some(status)) => Ok(status),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                let elapsed_ms = millis(started.elapsed());
                warn!(
                    "[agent] {} still running after {}ms, killed it",
                    executable.display(),
                    elapsed_ms
                );
                return Err(IssueError::ProcessTimedOut {
                    elapsed_ms,
                    stdout: stdout_reader.collect(Some(READER_GRACE)),
                    stderr: stderr_reader.collect(Some(READER_GRACE)),
                });
            }
            Err(err) => Err(err),
        },
    };

    let status = status.map_err(|err| IssueError::ProcessFailed {
        reason: format!("failed to wait for agent: {err}"),
        exit_code: None,
        stdout: String::new(),
        stderr: String::new(),
    })?;
    let duration = started.elapsed();
    let stdout = stdout_reader.collect(None);
    let stderr = stderr_reader.collect(None);

    if !status.success() {
        warn!(
            "[agent] {} {} after {}ms",
            executable.display(),
            describe(&status),
            duration.as_millis()
        );
        return Err(IssueError::ProcessFailed {
            reason: describe(&status),
            exit_code: status.code(),
            stdout,
            stderr,
        });
    }

    debug!(
        "[agent] exited successfully after {}ms (stdout {} bytes, stderr {} bytes)",
        duration.as_millis(),
        stdout.len(),
        stderr.len()
    );
    Ok(AgentRun {
        stdout,
        stderr,
        duration,
    })
}

/// One captured child stream. The buffer fills while the child runs, so a
/// partial capture is available even if the stream never closes.
struct OutputReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl OutputReader {
    fn spawn<R>(stream: Option<R>, name: &'static str) -> Self
    where
        R: Read + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done) = mpsc::channel();
        let sink = Arc::clone(&buf);
        thread::spawn(move || {
            if let Some(stream) = stream {
                if let Err(err) = drain(stream, &sink) {
                    debug!("[agent] reading {} failed, output truncated: {}", name, err);
                }
            }
            let _ = done_tx.send(());
        });
        Self { buf, done }
    }

    /// Waits for the stream to close, at most `grace` when given, and
    /// returns what was read.
    fn collect(self, grace: Option<Duration>) -> String {
        match grace {
            None => {
                let _ = self.done.recv();
            }
            Some(grace) => {
                let _ = self.done.recv_timeout(grace);
            }
        }
        let bytes = self
            .buf
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Copies `stream` into `sink` until EOF, keeping at most
/// `MAX_OUTPUT_BYTES` and discarding the rest.
fn drain<R: Read>(mut stream: R, sink: &Mutex<Vec<u8>>) -> io::Result<()> {
    let mut chunk = [0u8; 8192];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if let Ok(mut buf) = sink.lock() {
            let room = MAX_OUTPUT_BYTES.saturating_sub(buf.len());
            buf.extend_from_slice(&chunk[..read.min(room)]);
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn describe(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
