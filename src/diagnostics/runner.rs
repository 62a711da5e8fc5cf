//! Sequential checklist runner

use std::future::Future;
use std::time::Instant;

use tracing::{info, warn};

use super::check::{CheckResult, CheckStatus, SystemCheck};
use super::context::ProbeContext;

/// Width of the rule printed around category banners
pub const SECTION_WIDTH: usize = 60;

/// Results from running the checklist
#[derive(Debug, Default)]
pub struct DiagnosticReport {
    /// Individual check results with their category names
    pub results: Vec<(String, CheckResult)>,
    /// Total number of checks run
    pub total: usize,
    /// Number of passing checks
    pub passed: usize,
    /// Number of checks with warnings
    pub warned: usize,
    /// Number of failing checks
    pub failed: usize,
    /// Number of checks that only report what they saw
    pub informational: usize,
}

impl DiagnosticReport {
    fn record(&mut self, name: String, result: CheckResult) {
        match result.status {
            CheckStatus::Pass => self.passed += 1,
            CheckStatus::Warn => self.warned += 1,
            CheckStatus::Fail => self.failed += 1,
            CheckStatus::Info => self.informational += 1,
        }
        self.results.push((name, result));
        self.total = self.results.len();
    }

    /// Returns true if all checks passed (no failures)
    pub fn is_healthy(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warned > 0
    }

    /// Exit code for strict mode
    /// 0 = all pass, 1 = any fail, 2 = any warn (but no fail)
    ///
    /// Informational checks never change the code.
    pub fn exit_code(&self) -> i32 {
        if !self.is_healthy() {
            1
        } else if self.has_warnings() {
            2
        } else {
            0
        }
    }
}

/// The run stopped before every check finished
#[derive(Debug, thiserror::Error)]
#[error("diagnostic interrupted by user")]
pub struct Interrupted {
    /// Checks that completed before the interrupt
    pub partial: DiagnosticReport,
    /// Stdout was closed, so nobody is reading the results
    pub output_closed: bool,
}

/// Runs checks one after another, in the order they were added
pub struct DiagnosticRunner {
    checks: Vec<Box<dyn SystemCheck>>,
}

impl DiagnosticRunner {
    /// Creates a new runner with no checks
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Adds a check to the runner
    pub fn add_check<C: SystemCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Names of the registered checks, in run order
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Runs every check to completion
    pub async fn run(self, ctx: &ProbeContext) -> DiagnosticReport {
        match self.run_until(ctx, std::future::pending::<()>()).await {
            Ok(report) => report,
            Err(interrupted) => interrupted.partial,
        }
    }

    /// Runs checks until they all finish or `interrupt` resolves
    ///
    /// An interrupt drops the in-flight check, which kills any child process
    /// it started, and skips every remaining check. A closed transcript stops
    /// the run the same way once the current check returns.
    pub async fn run_until<F>(
        self,
        ctx: &ProbeContext,
        interrupt: F,
    ) -> Result<DiagnosticReport, Interrupted>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut report = DiagnosticReport::default();

        for check in self.checks {
            if ctx.transcript().is_closed() {
                warn!("Output closed, skipping remaining checks");
                return Err(Interrupted {
                    partial: report,
                    output_closed: true,
                });
            }

            let name = check.name().to_string();
            ctx.section(check.banner(), SECTION_WIDTH);
            info!(
                check = %name,
                description = check.description().unwrap_or_default(),
                "Running check"
            );

            let start = Instant::now();
            let result = tokio::select! {
                biased;
                () = &mut interrupt => {
                    warn!(check = %name, "Interrupted");
                    return Err(Interrupted {
                        partial: report,
                        output_closed: false,
                    });
                }
                result = check.check(ctx) => result,
            };
            let result = result.with_duration(start.elapsed());

            info!(
                check = %name,
                status = ?result.status,
                duration = ?result.duration,
                "Check finished"
            );
            report.record(name, result);
        }

        Ok(report)
    }
}

impl Default for DiagnosticRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let mut report = DiagnosticReport::default();
        report.record("a".into(), CheckResult::pass("ok"));
        assert_eq!(report.exit_code(), 0);

        report.record("b".into(), CheckResult::warn("meh"));
        assert_eq!(report.exit_code(), 2);
        assert!(report.is_healthy());

        report.record("c".into(), CheckResult::fail("broken"));
        assert_eq!(report.exit_code(), 1);
        assert!(!report.is_healthy());
        assert_eq!(report.total, 3);
    }

    #[test]
    fn test_informational_results_do_not_change_exit_code() {
        let mut report = DiagnosticReport::default();
        report.record("db".into(), CheckResult::info("0/5 probes succeeded"));
        report.record("env".into(), CheckResult::pass("ok"));

        assert_eq!(report.informational, 1);
        assert_eq!(report.total, 2);
        assert!(report.is_healthy());
        assert!(!report.has_warnings());
        assert_eq!(report.exit_code(), 0);
    }
}
