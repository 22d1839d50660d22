//! Bounded subprocess execution for the external diagnostic tools.

use std::io::{BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep draining pipes after a timeout kill. Grandchildren (e.g. `cc1`) may still
/// hold them open; their output is abandoned after this.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture output of {program}")]
    Capture { program: String },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured output of one tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ToolOutput {
    /// stdout followed by stderr; diagnostics may land on either stream.
    pub fn combined(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        out.push_str(&self.stdout);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }

    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.status.is_some_and(|s| s.success())
    }
}

/// Run `command` to completion, killing it once `timeout` elapses.
///
/// A timeout is not an error: the partial output is returned with `timed_out` set.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<ToolOutput, ExecError> {
    let program = command.get_program().to_string_lossy().to_string();

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        return Err(ExecError::Capture { program });
    };

    let stdout_rx = spawn_reader(stdout);
    let stderr_rx = spawn_reader(stderr);

    let start = Instant::now();
    let mut timed_out = false;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    timed_out = true;
                    let _ = child.kill();
                    break child.wait().ok();
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(ExecError::Wait { program, source });
            }
        }
    };

    let (stdout_bytes, stderr_bytes) = if timed_out {
        (
            stdout_rx.recv_timeout(DRAIN_GRACE).unwrap_or_default(),
            stderr_rx.recv_timeout(DRAIN_GRACE).unwrap_or_default(),
        )
    } else {
        (
            stdout_rx.recv().unwrap_or_default(),
            stderr_rx.recv().unwrap_or_default(),
        )
    };

    debug!(
        tool = %program,
        timed_out,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "tool finished"
    );

    Ok(ToolOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
        stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
        timed_out,
    })
}

fn spawn_reader(stream: impl Read + Send + 'static) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(read_all(stream));
    });
    rx
}

fn read_all(stream: impl Read) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut reader = BufReader::new(stream);
    let _ = reader.read_to_end(&mut buf);
    buf
}

/// Log a tool failure that the pass swallows. Louder when the run is verbose.
pub(crate) fn note_skipped(verbose: bool, tool: &str, reason: &dyn std::fmt::Display) {
    if verbose {
        warn!(tool, %reason, "tool unavailable, pass yields no issues");
    } else {
        debug!(tool, %reason, "tool unavailable, pass yields no issues");
    }
}
