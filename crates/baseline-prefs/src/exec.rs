//! Command execution boundary

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Captured result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs an argument vector. No shell is involved.
pub trait Exec: Send + Sync {
    fn exec(&self, argv: &[String]) -> Result<CommandOutput>;
}

impl<E: Exec + ?Sized> Exec for &E {
    fn exec(&self, argv: &[String]) -> Result<CommandOutput> {
        (**self).exec(argv)
    }
}

impl<E: Exec + ?Sized> Exec for Box<E> {
    fn exec(&self, argv: &[String]) -> Result<CommandOutput> {
        (**self).exec(argv)
    }
}

/// How stderr output from a command that exited 0 is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StderrPolicy {
    /// Log a warning and carry on.
    #[default]
    Warn,
    /// Treat it as a failure.
    Strict,
}

impl StderrPolicy {
    /// Turn an output into a failure according to the policy.
    pub fn check(&self, argv: &[String], output: CommandOutput) -> Result<CommandOutput> {
        let failed = || Error::ExternalCommand {
            argv: argv.to_vec(),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        };
        if !output.success() {
            return Err(failed());
        }
        if !output.stderr.trim().is_empty() {
            match self {
                Self::Strict => return Err(failed()),
                Self::Warn => {
                    tracing::warn!(?argv, stderr = %output.stderr.trim(), "command succeeded with warnings");
                }
            }
        }
        Ok(output)
    }
}

/// Runs commands as child processes with a deadline.
///
/// Output pipes are drained on helper threads so a chatty child cannot block
/// on a full pipe while the caller polls for exit. On timeout the child is
/// killed and reaped. The deadline also covers collecting output, since a
/// background grandchild can keep the pipes open after the child exits.
#[derive(Debug, Clone)]
pub struct SystemExec {
    timeout: Duration,
}

impl SystemExec {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemExec {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Wait for a drained pipe until `deadline`. `None` means the pipe is still
/// held open.
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<String> {
    let Some(rx) = rx else {
        return Some(String::new());
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let deadline = Instant::now() + REAP_TIMEOUT;
    while Instant::now() < deadline {
        if let Ok(Some(_)) = child.try_wait() {
            return;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    tracing::warn!(pid = child.id(), "child not reaped after kill");
}

impl Exec for SystemExec {
    fn exec(&self, argv: &[String]) -> Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or(Error::EmptyCommand)?;
        tracing::debug!(?argv, "running command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    kill_and_reap(&mut child);
                    return Err(Error::Timeout {
                        argv: argv.to_vec(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    kill_and_reap(&mut child);
                    return Err(Error::Spawn {
                        program: program.clone(),
                        source,
                    });
                }
            }
        };

        let timed_out = || Error::Timeout {
            argv: argv.to_vec(),
            timeout: self.timeout,
        };
        let stdout = collect(stdout, deadline).ok_or_else(timed_out)?;
        let stderr = collect(stderr, deadline).ok_or_else(timed_out)?;
        tracing::trace!(?argv, status = ?status.code(), "command finished");

        Ok(CommandOutput {
            stdout,
            stderr,
            status: status.code(),
        })
    }
}
