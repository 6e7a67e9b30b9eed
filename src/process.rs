//! Blocking subprocess execution with captured output and an optional deadline.
//!
//! Every external program this crate touches (`git`, the `aws` CLI) goes
//! through [`run`]. Output streams are drained on background threads so a
//! chatty child cannot deadlock on a full pipe, and a child that outlives its
//! deadline is killed and reaped rather than left orphaned.

use std::fmt;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::warn;

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// The outcome of one subprocess execution.
///
/// This is a read-only snapshot: callers inspect it once to decide control
/// flow and never mutate or retry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code, or `-1` if the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// Whether the process exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exit code: {} stdout: {} stderr: {}",
            self.exit_code,
            self.stdout.trim(),
            self.stderr.trim()
        )
    }
}

/// Run `command` to completion and capture its output.
///
/// `display` is the human-readable (already redacted) form of the command used
/// in errors and log lines. When `timeout` is set and elapses, the child is
/// killed and [`Error::CommandTimeout`] is returned.
pub fn run(mut command: Command, display: &str, timeout: Option<Duration>) -> Result<CommandResult> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| Error::CommandSpawn {
        command: display.to_string(),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        Some(limit) => wait_with_deadline(&mut child, display, limit)?,
        None => child.wait()?,
    };

    Ok(CommandResult {
        exit_code: status.code().unwrap_or(-1),
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            // A read error just truncates the captured output.
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn wait_with_deadline(child: &mut Child, display: &str, limit: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            warn!("Killing '{}' after {}s", display, limit.as_secs());
            // The child may exit between the poll and the kill.
            let _ = child.kill();
            let _ = child.wait();
            // Reader threads are left detached: grandchildren (git-remote-https)
            // can keep the pipes open past the kill.
            return Err(Error::CommandTimeout {
                command: display.to_string(),
                timeout: limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
