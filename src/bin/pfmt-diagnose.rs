//! Operator entry point: runs the full PFMT diagnostic checklist

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pfmt_diagnose::build_info;
use pfmt_diagnose::config::DiagnosticConfig;
use pfmt_diagnose::diagnostics::{self, ProbeContext, reporter::REPORT_WIDTH};

/// Diagnose the PFMT Docker Compose deployment
#[derive(Debug, Parser)]
#[command(name = "pfmt-diagnose", version, long_version = build_info::LONG_VERSION)]
struct Cli {
    /// Configuration file (defaults to config/diagnose.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Project directory to run from, if it exists
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Timeout for each command and HTTP request
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Exit with 1 if any category failed, 2 if any warned
    #[arg(long)]
    strict: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match print_banner().map_err(anyhow::Error::from).and_then(|()| run(cli)) {
        Ok(code) => code,
        Err(e) => {
            // Stdout may be the thing that failed
            let _ = writeln!(io::stdout(), "\n\n❌ Diagnostic failed with error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_banner() -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "🔧 PFMT Project Wizard Diagnostic Tool")?;
    writeln!(
        out,
        "This tool will help identify remaining issues after the database schema fix"
    )?;
    writeln!(out, "{}", "=".repeat(REPORT_WIDTH))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    info!(build = %build_info::version_string(), "Starting diagnostics");
    let mut config = DiagnosticConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.project_dir {
        config.project_dir = dir;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    enter_project_dir(&config.project_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let ctx = ProbeContext::new(config)?;

    let outcome = runtime.block_on(async {
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        diagnostics::default_checklist().run_until(&ctx, interrupt).await
    });

    match outcome {
        Ok(report) => {
            diagnostics::print_report(&report).context("failed to write report")?;
            writeln!(io::stdout(), "\n✅ Diagnostic complete!")?;

            if cli.strict {
                Ok(ExitCode::from(u8::try_from(report.exit_code()).unwrap_or(1)))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(stopped) if stopped.output_closed => {
            anyhow::bail!("standard output closed after {} categories", stopped.partial.total)
        }
        Err(interrupted) => {
            info!(completed = interrupted.partial.total, "Stopped early");
            writeln!(io::stdout(), "\n\n⚠️  Diagnostic interrupted by user")?;
            Ok(ExitCode::from(1))
        }
    }
}

/// Switches into the project directory when it exists
fn enter_project_dir(dir: &Path) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if dir.is_dir() {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to enter {}", dir.display()))?;
    } else {
        writeln!(out, "⚠️  Project directory not found, running from current location")?;
    }

    let cwd = std::env::current_dir().context("failed to read working directory")?;
    writeln!(out, "📁 Working directory: {}", cwd.display())?;
    Ok(())
}
