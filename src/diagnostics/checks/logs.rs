//! Error signature scan over recent container logs

use async_trait::async_trait;

use crate::diagnostics::check::{CheckResult, SystemCheck};
use crate::diagnostics::context::ProbeContext;
use crate::probe::CommandSpec;

/// Signatures found in `text`, in table order, compared case-insensitively
///
/// Plain substring search: a signature that happens to appear in unrelated
/// text is still reported.
pub fn find_signatures<'a>(text: &str, signatures: &'a [String]) -> Vec<&'a str> {
    let haystack = text.to_lowercase();
    signatures
        .iter()
        .filter(|signature| haystack.contains(&signature.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// Scans each container's recent logs for known failure signatures
pub struct LogAnalysisCheck;

impl LogAnalysisCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogAnalysisCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemCheck for LogAnalysisCheck {
    fn name(&self) -> &'static str {
        "Log Analysis"
    }

    fn banner(&self) -> &'static str {
        "📋 APPLICATION LOG ANALYSIS"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Known error signatures in the last log lines of each container")
    }

    async fn check(&self, ctx: &ProbeContext) -> CheckResult {
        let logs = &ctx.config.logs;
        let docker_bin = &ctx.config.compose.docker_bin;
        let mut flagged = Vec::new();
        let mut unreadable = Vec::new();

        for container in &logs.containers {
            ctx.blank();
            ctx.say(format!("🔍 Analyzing {} logs for errors...", container));

            let result = ctx
                .run_command(
                    &CommandSpec::docker_logs(docker_bin, container, logs.tail),
                    &format!("Getting {} logs", container),
                )
                .await;
            if !result.success() {
                unreadable.push(container.as_str());
                continue;
            }

            let output = result.combined_output();
            if output.is_empty() {
                ctx.say(format!("⚠️  No log output from {}", container));
                continue;
            }

            let found = find_signatures(&output, &logs.signatures);
            if found.is_empty() {
                ctx.say(format!("✅ No critical error patterns found in {}", container));
            } else {
                ctx.say(format!("❌ Found error patterns in {}:", container));
                for signature in &found {
                    ctx.say(format!("   - {}", signature));
                }
                flagged.push(format!("{} ({})", container, found.len()));
            }
        }

        if !flagged.is_empty() {
            CheckResult::fail(format!("error patterns in {}", flagged.join(", ")))
        } else if !unreadable.is_empty() {
            CheckResult::warn(format!("could not read logs of {}", unreadable.join(", ")))
        } else {
            CheckResult::pass("no error patterns found")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ERROR_SIGNATURES;

    fn signatures() -> Vec<String> {
        ERROR_SIGNATURES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clean_logs() {
        let logs = "Server listening on port 3002\nGET /health 200 3ms\n";
        assert!(find_signatures(logs, &signatures()).is_empty());
    }

    #[test]
    fn test_matches_are_case_insensitive() {
        let logs = "Error: connect econnrefused 172.18.0.2:5432\n\
                    fatal: password authentication failed for user \"pfmt_user\"";
        let table = signatures();
        let found = find_signatures(logs, &table);

        assert_eq!(
            found,
            vec!["password authentication failed", "ECONNREFUSED", "FATAL:", "ERROR:"]
        );
    }

    #[test]
    fn test_reports_exact_list_in_table_order() {
        let logs = "ERROR: relation does not exist\nFATAL:  role \"pfmt_user\" does not exist";
        let table = signatures();
        let found = find_signatures(logs, &table);

        assert_eq!(found, vec!["role \"pfmt_user\" does not exist", "FATAL:", "ERROR:"]);
    }

    #[test]
    fn test_substring_false_positive_is_reported() {
        let logs = "debug: counted 0 ERROR: lines";
        assert_eq!(find_signatures(logs, &signatures()), vec!["ERROR:"]);
    }
}
