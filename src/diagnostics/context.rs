//! Shared state handed to every check

use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use tracing::warn;

use crate::config::DiagnosticConfig;
use crate::probe::{CommandResult, CommandRunner, CommandSpec, CommandStatus, HttpProbe, ProbeError};

type Sink = Box<dyn Write + Send>;

/// Operator-facing output
///
/// Lines are echoed to stdout as they are produced so a slow probe never
/// hides earlier results. Tests use [`Transcript::captured`] instead.
///
/// The first failed write (usually a closed pipe) marks the transcript
/// closed and later lines are dropped. The runner checks
/// [`Transcript::is_closed`] between categories.
#[derive(Default)]
pub struct Transcript {
    sink: Option<Mutex<Sink>>,
    captured: Option<Mutex<Vec<String>>>,
    closed: AtomicBool,
}

impl Transcript {
    /// Echoes every line to stdout
    pub fn stdout() -> Self {
        Self::writer(io::stdout())
    }

    /// Echoes every line to `sink`
    pub fn writer(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Mutex::new(Box::new(sink))),
            ..Default::default()
        }
    }

    /// Records lines without printing them
    pub fn captured() -> Self {
        Self {
            captured: Some(Mutex::new(Vec::new())),
            ..Default::default()
        }
    }

    pub fn line(&self, line: impl Into<String>) {
        let line = line.into();
        if let Some(sink) = &self.sink
            && !self.is_closed()
            && let Ok(mut sink) = sink.lock()
            && let Err(e) = writeln!(sink, "{}", line).and_then(|()| sink.flush())
        {
            warn!(error = %e, "Output closed, dropping further lines");
            self.closed.store(true, Ordering::Relaxed);
        }
        if let Some(captured) = &self.captured
            && let Ok(mut lines) = captured.lock()
        {
            lines.push(line);
        }
    }

    pub fn blank(&self) {
        self.line(String::new());
    }

    /// Whether writing to the sink has failed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// Recorded lines, empty unless built with [`Transcript::captured`]
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .and_then(|captured| captured.lock().ok().map(|lines| lines.clone()))
            .unwrap_or_default()
    }

    /// Recorded lines joined with newlines
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

/// Everything a check needs to probe the stack
pub struct ProbeContext {
    pub config: DiagnosticConfig,
    pub commands: CommandRunner,
    pub http: HttpProbe,
    transcript: Transcript,
}

impl ProbeContext {
    /// Builds a context printing to stdout
    pub fn new(config: DiagnosticConfig) -> Result<Self, ProbeError> {
        let timeout = config.timeout();
        Ok(Self {
            commands: CommandRunner::new(timeout),
            http: HttpProbe::new(timeout)?,
            config,
            transcript: Transcript::stdout(),
        })
    }

    /// Replaces the output sink
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn say(&self, line: impl Into<String>) {
        self.transcript.line(line);
    }

    pub fn blank(&self) {
        self.transcript.blank();
    }

    /// Prints a section banner framed by rules of `width` characters
    pub fn section(&self, title: &str, width: usize) {
        let rule = "=".repeat(width);
        self.blank();
        self.say(rule.clone());
        self.say(title.bold().to_string());
        self.say(rule);
    }

    /// Runs a command and prints its outcome
    pub async fn run_command(&self, spec: &CommandSpec, description: &str) -> CommandResult {
        self.blank();
        self.say(format!("🔍 {}", description));
        self.say(format!("Command: {}", spec));

        let result = self.commands.execute(spec).await;
        self.report_command(&result);
        result
    }

    fn report_command(&self, result: &CommandResult) {
        match &result.status {
            CommandStatus::Success => {
                self.say(format!("✅ {}", "SUCCESS".green()));
                if !result.message().is_empty() {
                    self.say(format!("Output: {}", result.message()));
                }
            }
            CommandStatus::Failed(code) => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                self.say(format!("❌ {} (Exit code: {})", "FAILED".red(), code));
                if !result.message().is_empty() {
                    self.say(format!("Error: {}", result.message()));
                }
            }
            CommandStatus::TimedOut(timeout) => {
                self.say(format!("⏰ {} ({}s)", "TIMEOUT".yellow(), timeout.as_secs()));
            }
            CommandStatus::LaunchFailed(message) => {
                self.say(format!("❌ {}: {}", "EXCEPTION".red(), message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_context() -> ProbeContext {
        ProbeContext::new(DiagnosticConfig::default())
            .unwrap()
            .with_transcript(Transcript::captured())
    }

    #[test]
    fn test_captured_transcript_records_lines() {
        let transcript = Transcript::captured();
        transcript.line("one");
        transcript.blank();
        transcript.line("two");

        assert_eq!(transcript.lines(), vec!["one", "", "two"]);
        assert_eq!(transcript.text(), "one\n\ntwo");
    }

    #[test]
    fn test_stdout_transcript_records_nothing() {
        let transcript = Transcript::stdout();
        transcript.line("printed");
        assert!(transcript.lines().is_empty());
        assert!(!transcript.is_closed());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_closes_transcript() {
        let transcript = Transcript::writer(ClosedPipe);
        assert!(!transcript.is_closed());

        transcript.line("first");
        assert!(transcript.is_closed());

        // Later lines are dropped quietly
        transcript.line("second");
        assert!(transcript.is_closed());
    }

    #[tokio::test]
    async fn test_run_command_prints_success() {
        let ctx = quiet_context();
        let spec = CommandSpec::new("sh", ["-c", "echo ready"]);
        let result = ctx.run_command(&spec, "Checking readiness").await;

        assert!(result.success());
        let text = ctx.transcript().text();
        assert!(text.contains("🔍 Checking readiness"));
        assert!(text.contains("Command: sh -c \"echo ready\""));
        assert!(text.contains("SUCCESS"));
        assert!(text.contains("Output: ready"));
    }

    #[tokio::test]
    async fn test_run_command_prints_failure_with_stderr() {
        let ctx = quiet_context();
        let spec = CommandSpec::new("sh", ["-c", "echo 'no such container' >&2; exit 1"]);
        let result = ctx.run_command(&spec, "Getting logs").await;

        assert!(!result.success());
        let text = ctx.transcript().text();
        assert!(text.contains("FAILED"));
        assert!(text.contains("(Exit code: 1)"));
        assert!(text.contains("Error: no such container"));
    }
}
