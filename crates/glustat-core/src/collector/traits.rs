//! Abstraction over running the gluster CLI, to enable testing and mocking.
//!
//! The `CommandRunner` trait lets the collector work with the real `gluster`
//! binary in production and with canned output in tests.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::util::format_duration;

/// How often a running command is checked for exit or timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Program used for privilege elevation.
const SUDO: &str = "sudo";

/// Why a gluster invocation failed.
#[derive(Debug)]
pub enum CommandErrorKind {
    /// The process could not be started.
    Spawn(io::Error),
    /// Waiting on the process failed.
    Io(io::Error),
    /// The process exited unsuccessfully. `code` is `None` when killed by a signal.
    Exit { code: Option<i32>, stderr: String },
    /// The process did not finish in time and was killed.
    Timeout(Duration),
}

impl std::fmt::Display for CommandErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandErrorKind::Spawn(e) => write!(f, "failed to start: {}", e),
            CommandErrorKind::Io(e) => write!(f, "I/O error: {}", e),
            CommandErrorKind::Exit { code, stderr } => {
                match code {
                    Some(code) => write!(f, "exit status {}", code)?,
                    None => write!(f, "terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            CommandErrorKind::Timeout(timeout) => {
                write!(f, "timed out after {}", format_duration(*timeout))
            }
        }
    }
}

/// Failed gluster invocation.
///
/// Keeps whatever stdout was produced before the failure in `output`.
#[derive(Debug)]
pub struct CommandError {
    pub kind: CommandErrorKind,
    /// Full argument vector, including `sudo` when used.
    pub args: Vec<String>,
    pub use_sudo: bool,
    pub output: Vec<u8>,
}

impl CommandError {
    pub fn new(kind: CommandErrorKind, args: &[String], use_sudo: bool, output: Vec<u8>) -> Self {
        Self {
            kind,
            args: args.to_vec(),
            use_sudo,
            output,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error running gluster command: {} - use_sudo: {} - cmdArgs: {:?}",
            self.kind, self.use_sudo, self.args
        )
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            CommandErrorKind::Spawn(e) | CommandErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs `gluster volume profile <volume> info cumulative`.
///
/// Implementations must be usable from concurrent collection cycles.
pub trait CommandRunner: Send + Sync {
    /// Runs the profile command for `volume` and returns its stdout.
    ///
    /// # Arguments
    /// * `binary` - Path to the gluster binary
    /// * `volume` - Volume to profile
    /// * `timeout` - Wall-clock limit for the process
    /// * `use_sudo` - Prefix the command with `sudo`
    fn run(
        &self,
        binary: &Path,
        volume: &str,
        timeout: Duration,
        use_sudo: bool,
    ) -> Result<Vec<u8>, CommandError>;
}

/// Builds the argument vector for the profile command.
///
/// The first element is the program to execute.
pub fn profile_command(binary: &Path, volume: &str, use_sudo: bool) -> Vec<String> {
    let mut args = Vec::with_capacity(7);
    if use_sudo {
        args.push(SUDO.to_string());
    }
    args.push(binary.to_string_lossy().into_owned());
    args.extend(
        ["volume", "profile", volume, "info", "cumulative"]
            .iter()
            .map(|s| s.to_string()),
    );
    args
}

/// Runner that spawns the real gluster process.
///
/// Use this in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        binary: &Path,
        volume: &str,
        timeout: Duration,
        use_sudo: bool,
    ) -> Result<Vec<u8>, CommandError> {
        let args = profile_command(binary, volume, use_sudo);
        debug!(command = ?args, "running gluster");

        let mut child = Command::new(&args[0])
            .args(&args[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CommandError::new(CommandErrorKind::Spawn(e), &args, use_sudo, Vec::new())
            })?;

        let stdout = PipeReader::spawn(child.stdout.take());
        let stderr = PipeReader::spawn(child.stderr.take());

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        // Readers may stay blocked if a grandchild keeps the
                        // pipe open, so only take what has arrived so far.
                        return Err(CommandError::new(
                            CommandErrorKind::Timeout(timeout),
                            &args,
                            use_sudo,
                            stdout.snapshot(),
                        ));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CommandError::new(
                        CommandErrorKind::Io(e),
                        &args,
                        use_sudo,
                        stdout.snapshot(),
                    ));
                }
            }
        };

        // A grandchild may inherit the pipes and keep them open after the
        // child exits, so the drain shares the same deadline.
        let deadline = start + timeout;
        if !stdout.wait_closed(deadline) {
            return Err(CommandError::new(
                CommandErrorKind::Timeout(timeout),
                &args,
                use_sudo,
                stdout.snapshot(),
            ));
        }
        let output = stdout.finish();
        let stderr = if stderr.wait_closed(deadline) {
            stderr.finish()
        } else {
            stderr.snapshot()
        };
        debug!(
            status = %status,
            bytes = output.len(),
            elapsed = %format_duration(start.elapsed()),
            "gluster finished"
        );

        if !status.success() {
            return Err(CommandError::new(
                CommandErrorKind::Exit {
                    code: status.code(),
                    stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                },
                &args,
                use_sudo,
                output,
            ));
        }

        Ok(output)
    }
}

/// Drains a child pipe on a helper thread into a shared buffer.
struct PipeReader {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = pipe.map(|mut pipe| {
            let buf = Arc::clone(&buf);
            thread::spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => {
                            if let Ok(mut buf) = buf.lock() {
                                buf.extend_from_slice(&chunk[..n]);
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
            })
        });
        Self { buf, handle }
    }

    /// Copy of the bytes read so far.
    fn snapshot(&self) -> Vec<u8> {
        self.buf.lock().map(|buf| buf.clone()).unwrap_or_default()
    }

    /// Waits until the pipe is closed or `deadline` passes.
    /// Returns `true` if the pipe was closed in time.
    fn wait_closed(&self, deadline: Instant) -> bool {
        let Some(handle) = &self.handle else {
            return true;
        };
        while !handle.is_finished() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
        true
    }

    /// Waits for the pipe to close and returns everything read.
    fn finish(mut self) -> Vec<u8> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.buf
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}
