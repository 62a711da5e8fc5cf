//! External command execution
//!
//! Every command probe goes through [`CommandRunner::execute`], which never
//! fails outward: launch errors, non-zero exits and timeouts all come back
//! as a [`CommandResult`].

use std::fmt;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, warn};

/// Message reported for a command that exceeded its timeout
pub const TIMED_OUT_MESSAGE: &str = "Command timed out";

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `<docker> logs <container> --tail <lines>`
    pub fn docker_logs(docker_bin: &str, container: &str, tail: u32) -> Self {
        Self::new(
            docker_bin,
            ["logs".to_string(), container.to_string(), "--tail".to_string(), tail.to_string()],
        )
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How a command finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// Exit code 0
    Success,
    /// Non-zero exit, or killed by a signal (no code)
    Failed(Option<i32>),
    /// Killed after exceeding the timeout
    TimedOut(Duration),
    /// The process could not be started
    LaunchFailed(String),
}

/// Captured result of one command invocation
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        matches!(self.status, CommandStatus::Success)
    }

    /// The text that accompanies the outcome: stdout on success, stderr on
    /// failure, or a fixed message for timeouts and launch errors
    pub fn message(&self) -> &str {
        match &self.status {
            CommandStatus::Success => self.stdout.trim(),
            CommandStatus::Failed(_) => self.stderr.trim(),
            CommandStatus::TimedOut(_) => TIMED_OUT_MESSAGE,
            CommandStatus::LaunchFailed(message) => message.as_str(),
        }
    }

    /// Stdout and stderr joined, for scanning tools like `docker logs` that
    /// relay the container's stderr on their own
    pub fn combined_output(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

/// Runs commands with a fixed timeout
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Executes `spec` and captures its output
    ///
    /// The child runs in its own process group. The whole group is killed if
    /// the timeout expires or the returned future is dropped, so wrapper
    /// scripts cannot leave their own children behind.
    pub async fn execute(&self, spec: &CommandSpec) -> CommandResult {
        let start = Instant::now();
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(command = %spec, error = %e, "Command failed to start");
                return CommandResult {
                    status: CommandStatus::LaunchFailed(e.to_string()),
                    stdout: String::new(),
                    stderr: String::new(),
                };
            }
        };
        let mut group = ProcessGroupGuard::new(child.id());

        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                group.disarm();
                let status = if output.status.success() {
                    CommandStatus::Success
                } else {
                    CommandStatus::Failed(output.status.code())
                };
                CommandResult {
                    status,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Ok(Err(e)) => CommandResult {
                status: CommandStatus::LaunchFailed(e.to_string()),
                stdout: String::new(),
                stderr: String::new(),
            },
            Err(_) => {
                warn!(command = %spec, timeout = ?self.timeout, "Command timed out");
                CommandResult {
                    status: CommandStatus::TimedOut(self.timeout),
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
        };

        debug!(
            command = %spec,
            status = ?result.status,
            elapsed = ?start.elapsed(),
            "Command finished"
        );

        result
    }
}

/// Kills a child's process group when dropped, unless disarmed
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    #[cfg(unix)]
    fn drop(&mut self) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let Some(pgid) = self.pgid.and_then(|pid| i32::try_from(pid).ok()) else {
            return;
        };
        // ESRCH just means the group already exited
        if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL)
            && e != nix::errno::Errno::ESRCH
        {
            warn!(pgid, error = %e, "Failed to kill process group");
        }
    }

    #[cfg(not(unix))]
    fn drop(&mut self) {}
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS))
    }
}
