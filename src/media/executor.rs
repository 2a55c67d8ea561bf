//! Subprocess seam for the media toolchain.
//!
//! The `CommandExecutor` trait enables full testability of the prober and
//! extractor without ffmpeg/ffprobe installed.

use crate::error::{ChatscribeError, Result};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Trait for executing media toolchain commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Returns combined stdout of the command on success.
    /// Returns `ToolchainMissing` if the binary is absent and
    /// `CommandFailed` (with captured stderr) on a non-zero exit.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;
}

impl<E: CommandExecutor> CommandExecutor for Arc<E> {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        (**self).execute(command, args)
    }
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ChatscribeError::ToolchainMissing {
                    tool: command.to_string(),
                }
            } else {
                ChatscribeError::CommandFailed {
                    command: command.to_string(),
                    output: e.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChatscribeError::CommandFailed {
                command: command.to_string(),
                output: format!("status {:?}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// A single recorded invocation, for assertions in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Default)]
struct MockExecutorState {
    /// Scripted stdout per command name, consumed front to back.
    outputs: Mutex<HashMap<String, VecDeque<Result<String>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Mock executor for testing the prober and extractor.
///
/// Scripted per command name; unscripted commands succeed with empty output.
#[derive(Clone, Default)]
pub struct MockCommandExecutor {
    state: Arc<MockExecutorState>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stdout response for the next invocation of `command`.
    pub fn with_output(self, command: &str, output: &str) -> Self {
        self.push(command, Ok(output.to_string()));
        self
    }

    /// Queue a failure for the next invocation of `command`.
    pub fn with_error(self, command: &str, error: ChatscribeError) -> Self {
        self.push(command, Err(error));
        self
    }

    fn push(&self, command: &str, result: Result<String>) {
        let mut outputs = self.state.outputs.lock().unwrap();
        outputs.entry(command.to_string()).or_default().push_back(result);
    }

    /// All invocations recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Invocations of a specific command, in order.
    pub fn calls_for(&self, command: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.command == command)
            .collect()
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        self.state.calls.lock().unwrap().push(RecordedCall {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });

        let mut outputs = self.state.outputs.lock().unwrap();
        match outputs.get_mut(command).and_then(|queue| queue.pop_front()) {
            Some(result) => result,
            None => Ok(String::new()),
        }
    }
}
