//! Probe primitives: external commands and HTTP requests

pub mod command;
pub mod http;

pub use command::{CommandResult, CommandRunner, CommandSpec, CommandStatus, TIMED_OUT_MESSAGE};
pub use http::{HttpOutcome, HttpProbe, ProbeError, StatusClass, classify_status};
