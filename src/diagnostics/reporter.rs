//! Formatting for the end-of-run summary and the static operator report

use std::io::{self, Write};

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::runner::DiagnosticReport;

/// Width of the rule around the final report
pub const REPORT_WIDTH: usize = 80;

/// Areas the checklist covers, in run order
const TESTED_AREAS: [&str; 6] = [
    "Docker container status and logs",
    "Database connection and user authentication",
    "API endpoint availability and responses",
    "Environment configuration files",
    "Application log analysis for error patterns",
    "Wizard functionality end-to-end testing",
];

const NEXT_STEPS: [&str; 5] = [
    "Review the output above for any ❌ FAILED items",
    "Check specific error messages in the log analysis section",
    "Verify that all containers are running properly",
    "Test API endpoints manually if needed",
    "Provide this diagnostic output to support for further analysis",
];

const COMMON_ISSUES: [&str; 5] = [
    "Are all Docker containers running?",
    "Is the database accepting connections?",
    "Are API endpoints responding correctly?",
    "Are there any authentication/authorization errors?",
    "Is the frontend properly configured to call the backend?",
];

/// Formats the per-category results as a table with a summary
pub fn format_summary_table(report: &DiagnosticReport) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Category", "Status", "Duration", "Message"]);

    for (name, result) in &report.results {
        let duration_str = format!("{:.2?}", result.duration);
        builder.push_record([
            name.as_str(),
            &result.status.as_colored_str(),
            &duration_str,
            &result.message,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = String::new();
    output.push_str(&table.to_string());
    output.push('\n');
    output.push_str(&format_counts(report));

    output
}

fn format_counts(report: &DiagnosticReport) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("\n{}\n", "Summary".bold().underline()));
    summary.push_str(&format!("  Categories checked: {}\n", report.total));
    summary.push_str(&format!("  {} Passed: {}\n", "✓".green(), report.passed));

    if report.warned > 0 {
        summary.push_str(&format!("  {} Warned: {}\n", "⚠".yellow(), report.warned));
    }

    if report.failed > 0 {
        summary.push_str(&format!("  {} Failed: {}\n", "✗".red(), report.failed));
    }

    if report.informational > 0 {
        summary.push_str(&format!(
            "  {} Informational: {}\n",
            "ℹ".blue(),
            report.informational
        ));
    }

    summary.push('\n');
    if report.is_healthy() {
        if report.has_warnings() {
            summary.push_str(&format!(
                "  {}\n",
                "Overall: HEALTHY (with warnings)".yellow().bold()
            ));
        } else {
            summary.push_str(&format!("  {}\n", "Overall: HEALTHY".green().bold()));
        }
    } else {
        summary.push_str(&format!("  {}\n", "Overall: UNHEALTHY".red().bold()));
    }

    summary
}

/// The fixed checklist and next steps printed at the end of every run
///
/// Independent of check outcomes: the text is identical on every run.
pub fn static_report() -> String {
    let rule = "=".repeat(REPORT_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", rule));
    out.push_str("📊 PFMT WIZARD DIAGNOSTIC REPORT\n");
    out.push_str(&format!("{}\n", rule));

    out.push_str("This diagnostic has tested the following areas:\n");
    for (i, area) in TESTED_AREAS.iter().enumerate() {
        out.push_str(&format!("{}. ✅ {}\n", i + 1, area));
    }

    out.push_str("\n📋 NEXT STEPS:\n");
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step));
    }

    out.push_str("\n💡 COMMON ISSUES TO CHECK:\n");
    for issue in COMMON_ISSUES {
        out.push_str(&format!("- {}\n", issue));
    }

    out
}

/// Writes the summary table, per-category details and the static report
pub fn write_report<W: Write>(out: &mut W, report: &DiagnosticReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", format_summary_table(report))?;

    for (name, result) in &report.results {
        if let Some(details) = &result.details {
            writeln!(out, "{} Details:", name.bold())?;
            for line in details.lines() {
                writeln!(out, "  {}", line)?;
            }
        }
    }

    write!(out, "{}", static_report())?;
    out.flush()
}

/// Prints the full report to stdout
pub fn print_report(report: &DiagnosticReport) -> io::Result<()> {
    write_report(&mut io::stdout().lock(), report)
}
