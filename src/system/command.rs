//! Shell command execution with a bounded timeout
//!
//! Every external interaction (systemctl, ss, curl) goes through the
//! `CommandRunner` trait. Production code uses `ShellRunner`; tests use
//! `MockRunner` which records command lines and replays scripted outcomes.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Hard limit for any single external command
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Marker placed in `stderr` when a command exceeds `COMMAND_TIMEOUT`
pub const TIMEOUT_MARKER: &str = "Command timed out";

/// Outcome of one command invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// True iff the process exited with status zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Failed invocation that never produced output (timeout, spawn failure)
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }
}

/// Trait for running shell command lines
///
/// Implementations never return an error: launch failures and timeouts are
/// folded into an unsuccessful `CommandOutput`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str) -> CommandOutput;
}

/// Runs command lines through `sh -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Duration,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Runner with a non-standard timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str) -> CommandOutput {
        let child = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(c) => c,
            Err(e) => {
                warn!(command = %command_line, error = %e, "Failed to launch command");
                return CommandOutput::failed(e.to_string());
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = CommandOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                debug!(
                    command = %command_line,
                    success = result.success,
                    code = ?output.status.code(),
                    "Command finished"
                );
                result
            }
            Ok(Err(e)) => {
                warn!(command = %command_line, error = %e, "Command failed");
                CommandOutput::failed(e.to_string())
            }
            Err(_) => {
                // Dropping the wait future drops the child, which kills it
                warn!(command = %command_line, timeout = ?self.timeout, "Command timed out");
                CommandOutput::failed(TIMEOUT_MARKER)
            }
        }
    }
}

/// Mock runner for testing - records command lines, replays scripted outcomes
///
/// Commands without a scripted outcome succeed with empty output.
#[cfg(test)]
#[derive(Default)]
pub struct MockRunner {
    responses: std::sync::Mutex<Vec<(String, CommandOutput)>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for any command line containing `pattern`
    pub fn respond(self, pattern: &str, output: CommandOutput) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((pattern.to_string(), output));
        self
    }

    /// Script a failure (non-zero exit) for any command line containing `pattern`
    pub fn fail(self, pattern: &str) -> Self {
        self.respond(pattern, CommandOutput::failed(""))
    }

    /// Command lines run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command_line: &str) -> CommandOutput {
        #[allow(clippy::unwrap_used)]
        self.calls.lock().unwrap().push(command_line.to_string());

        #[allow(clippy::unwrap_used)]
        let responses = self.responses.lock().unwrap();
        responses
            .iter()
            .find(|(pattern, _)| command_line.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or(CommandOutput {
                success: true,
                ..CommandOutput::default()
            })
    }
}
