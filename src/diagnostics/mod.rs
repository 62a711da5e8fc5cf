//! Diagnostic checklist for the PFMT stack
//!
//! Each category implements [`SystemCheck`] and prints its probes as they
//! run. [`DiagnosticRunner`] executes categories strictly one after another
//! and collects a [`DiagnosticReport`] for the closing summary.
//!
//! # Example
//!
//! ```no_run
//! use pfmt_diagnose::config::DiagnosticConfig;
//! use pfmt_diagnose::diagnostics::{self, ProbeContext};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let ctx = ProbeContext::new(DiagnosticConfig::default())?;
//! let report = diagnostics::default_checklist().run(&ctx).await;
//! diagnostics::print_report(&report)?;
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod checks;
pub mod context;
pub mod reporter;
pub mod runner;

pub use check::{CheckResult, CheckStatus, SystemCheck};
pub use context::{ProbeContext, Transcript};
pub use reporter::{format_summary_table, print_report, static_report, write_report};
pub use runner::{DiagnosticReport, DiagnosticRunner, Interrupted};

/// The full checklist in its fixed order
pub fn default_checklist() -> DiagnosticRunner {
    DiagnosticRunner::new()
        .add_check(checks::ContainerStatusCheck::new())
        .add_check(checks::DatabaseCheck::new())
        .add_check(checks::EndpointCheck::new())
        .add_check(checks::EnvironmentCheck::new())
        .add_check(checks::LogAnalysisCheck::new())
        .add_check(checks::WizardCheck::new())
}
