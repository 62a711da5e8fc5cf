//! PFMT stack diagnostics
//!
//! Probes the Docker Compose deployment of the PFMT application (PostgreSQL,
//! backend API, frontend) and prints a report for the operator.

/// Build-time information (timestamp, target, compiler)
pub mod build_info;

/// Probe tables and layered configuration
pub mod config;

/// Checklist categories, runner and reporting
pub mod diagnostics;

/// External command and HTTP primitives
pub mod probe;
