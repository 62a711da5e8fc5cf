//! Core diagnostic check trait and types

use std::time::Duration;

use async_trait::async_trait;

use super::context::ProbeContext;

/// Status of a diagnostic check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Every probe in the category succeeded
    Pass,
    /// Some probes failed or found something worth a look
    Warn,
    /// The category could not be checked or is broken
    Fail,
    /// Results are shown to the operator but not judged
    Info,
}

impl CheckStatus {
    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => "PASS".green().to_string(),
            CheckStatus::Warn => "WARN".yellow().to_string(),
            CheckStatus::Fail => "FAIL".red().to_string(),
            CheckStatus::Info => "INFO".blue().to_string(),
        }
    }

    /// Derives a status from how many of `total` probes succeeded
    pub fn from_counts(succeeded: usize, total: usize) -> Self {
        if succeeded == total {
            CheckStatus::Pass
        } else if succeeded == 0 {
            CheckStatus::Fail
        } else {
            CheckStatus::Warn
        }
    }
}

/// Result of a diagnostic check
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// The status of the check
    pub status: CheckStatus,
    /// Brief message describing the result
    pub message: String,
    /// Optional detailed information
    pub details: Option<String>,
    /// How long the check took
    pub duration: Duration,
}

impl CheckResult {
    /// Creates a passing check result
    pub fn pass(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Pass, message)
    }

    /// Creates a warning check result
    pub fn warn(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Warn, message)
    }

    /// Creates a failing check result
    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Fail, message)
    }

    /// Creates an informational result that never affects the exit code
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_status(CheckStatus::Info, message)
    }

    pub fn with_status(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            duration: Duration::ZERO,
        }
    }

    /// Adds optional details to the result
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Sets the duration for this check
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// One category of the diagnostic checklist
#[async_trait]
pub trait SystemCheck: Send + Sync {
    /// Short name used in the summary table
    fn name(&self) -> &'static str;

    /// Section banner printed before the check runs
    fn banner(&self) -> &'static str;

    /// Runs every probe in the category, printing as it goes
    async fn check(&self, ctx: &ProbeContext) -> CheckResult;

    /// Optional description of what this check validates
    fn description(&self) -> Option<&'static str> {
        None
    }
}
