//! In-memory command runner for testing collectors without a gluster cluster.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::collector::traits::{CommandError, CommandErrorKind, CommandRunner, profile_command};

/// Canned behaviour for one volume.
#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Exit { code: i32, stderr: String },
    Timeout,
}

/// Runner that answers from a table of per-volume responses.
///
/// Volumes without an entry fail like the real CLI does for an unknown volume.
/// Every call is recorded so tests can check which volumes were attempted.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<String, Response>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `volume` return `output` on stdout.
    pub fn add_output(&mut self, volume: impl Into<String>, output: impl Into<String>) {
        self.responses
            .insert(volume.into(), Response::Output(output.into()));
    }

    /// Makes `volume` exit with `code` and `stderr`.
    pub fn add_failure(&mut self, volume: impl Into<String>, code: i32, stderr: impl Into<String>) {
        self.responses.insert(
            volume.into(),
            Response::Exit {
                code,
                stderr: stderr.into(),
            },
        );
    }

    /// Makes `volume` hit the timeout.
    pub fn add_timeout(&mut self, volume: impl Into<String>) {
        self.responses.insert(volume.into(), Response::Timeout);
    }

    /// Volumes passed to `run`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn run(
        &self,
        binary: &Path,
        volume: &str,
        timeout: Duration,
        use_sudo: bool,
    ) -> Result<Vec<u8>, CommandError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(volume.to_string());
        }

        let args = profile_command(binary, volume, use_sudo);
        let kind = match self.responses.get(volume) {
            Some(Response::Output(out)) => return Ok(out.clone().into_bytes()),
            Some(Response::Exit { code, stderr }) => CommandErrorKind::Exit {
                code: Some(*code),
                stderr: stderr.clone(),
            },
            Some(Response::Timeout) => CommandErrorKind::Timeout(timeout),
            None => CommandErrorKind::Exit {
                code: Some(1),
                stderr: format!("Volume {} does not exist", volume),
            },
        };
        Err(CommandError::new(kind, &args, use_sudo, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_output() {
        let mut runner = MockRunner::new();
        runner.add_output("vol0", "Data Read: 1 bytes\n");

        let out = runner
            .run(Path::new("gluster"), "vol0", Duration::from_secs(1), false)
            .unwrap();
        assert_eq!(out, b"Data Read: 1 bytes\n");
        assert_eq!(runner.calls(), vec!["vol0"]);
    }

    #[test]
    fn test_mock_runner_unknown_volume() {
        let runner = MockRunner::new();
        let err = runner
            .run(Path::new("gluster"), "nope", Duration::from_secs(1), true)
            .unwrap_err();
        assert!(err.use_sudo);
        assert!(err.to_string().contains("Volume nope does not exist"));
    }

    #[test]
    fn test_mock_runner_timeout() {
        let mut runner = MockRunner::new();
        runner.add_timeout("slow");
        let err = runner
            .run(Path::new("gluster"), "slow", Duration::from_millis(500), false)
            .unwrap_err();
        assert!(matches!(err.kind, CommandErrorKind::Timeout(d) if d == Duration::from_millis(500)));
    }
}
