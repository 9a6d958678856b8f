//! Running external programs.

use async_trait::async_trait;
use opsaudit_core::{OpsError, Result};
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the process exited with status 0
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout of a successful run, or a [`OpsError::CommandFailed`]
    pub fn into_stdout(self, program: &str) -> Result<String> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(OpsError::CommandFailed {
                program: program.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Something that can run a program and capture its output.
///
/// Collectors take `&dyn CommandRunner` so they can be driven by
/// [`ScriptedRunner`] in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait for it to exit
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Like [`run`](Self::run), but give up after `timeout`
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput>;

    /// Whether `program` can be found on `PATH`
    fn is_installed(&self, program: &str) -> bool;
}

/// Runs real processes with `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    _private: (),
}

impl SystemRunner {
    /// Create a runner
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn command(program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            // Parsers expect untranslated tool output
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn convert(program: &str, output: std::process::Output) -> CommandOutput {
        let out = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(program, code = ?out.code, stdout_len = out.stdout.len(), "command finished");
        out
    }

    fn spawn_error(program: &str, e: std::io::Error) -> OpsError {
        if e.kind() == std::io::ErrorKind::NotFound {
            OpsError::ToolMissing(program.to_string())
        } else {
            OpsError::Io(e)
        }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!(program, ?args, "running command");
        let output = Self::command(program, args)
            .output()
            .await
            .map_err(|e| Self::spawn_error(program, e))?;
        Ok(Self::convert(program, output))
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        debug!(program, ?args, timeout_secs = timeout.as_secs(), "running command with timeout");
        let output = tokio::time::timeout(timeout, Self::command(program, args).output())
            .await
            .map_err(|_| OpsError::Timeout {
                program: program.to_string(),
                seconds: timeout.as_secs(),
            })?
            .map_err(|e| Self::spawn_error(program, e))?;
        Ok(Self::convert(program, output))
    }

    fn is_installed(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Replies to known command lines with canned output.
///
/// Command lines are matched as `program` followed by the arguments joined
/// with single spaces. Unknown command lines behave like a missing tool.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: HashMap<String, CommandOutput>,
    installed: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    /// Create a runner that knows no commands
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `cmdline` with `output`
    #[must_use]
    pub fn respond(mut self, cmdline: &str, output: CommandOutput) -> Self {
        if let Some(program) = cmdline.split_whitespace().next() {
            self.installed.insert(program.to_string());
        }
        self.replies.insert(cmdline.to_string(), output);
        self
    }

    /// Reply to `cmdline` with a successful run printing `stdout`
    #[must_use]
    pub fn stdout(self, cmdline: &str, stdout: &str) -> Self {
        self.respond(cmdline, CommandOutput::ok(stdout))
    }

    /// Reply to `cmdline` with a failed run
    #[must_use]
    pub fn fail(self, cmdline: &str, code: i32, stderr: &str) -> Self {
        self.respond(cmdline, CommandOutput::failed(code, stderr))
    }

    /// Mark `program` as present on `PATH` without scripting any reply
    #[must_use]
    pub fn installed(mut self, program: &str) -> Self {
        self.installed.insert(program.to_string());
        self
    }

    /// Command lines run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn reply(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let cmdline = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cmdline.clone());
        }
        self.replies
            .get(&cmdline)
            .cloned()
            .ok_or_else(|| OpsError::ToolMissing(program.to_string()))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.reply(program, args)
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandOutput> {
        self.reply(program, args)
    }

    fn is_installed(&self, program: &str) -> bool {
        self.installed.contains(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_stdout_reports_failures() {
        assert_eq!(CommandOutput::ok("hi").into_stdout("echo").unwrap(), "hi");

        let err = CommandOutput::failed(2, "  bad flag\n")
            .into_stdout("ufw")
            .unwrap_err();
        match err {
            OpsError::CommandFailed {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "ufw");
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "bad flag");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn scripted_runner_matches_full_command_lines() {
        let runner = ScriptedRunner::new()
            .stdout("ufw status", "Status: active\n")
            .fail("sshd -T", 255, "no hostkeys")
            .installed("docker");

        let out = runner.run("ufw", &["status"]).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "Status: active\n");

        let out = runner.run("sshd", &["-T"]).await.unwrap();
        assert!(!out.success());

        assert!(matches!(
            runner.run("ufw", &["status", "verbose"]).await,
            Err(OpsError::ToolMissing(_))
        ));

        assert!(runner.is_installed("ufw"));
        assert!(runner.is_installed("docker"));
        assert!(!runner.is_installed("fail2ban-client"));
        assert_eq!(
            runner.calls(),
            vec!["ufw status", "sshd -T", "ufw status verbose"]
        );
    }

    #[tokio::test]
    async fn system_runner_reports_missing_programs() {
        let runner = SystemRunner::new();
        let err = runner
            .run("opsaudit-definitely-not-installed", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::ToolMissing(_)));
        assert!(!runner.is_installed("opsaudit-definitely-not-installed"));
    }
}
