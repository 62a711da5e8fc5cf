//! `.env` and `docker-compose.yml` content checks

use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::diagnostics::check::{CheckResult, SystemCheck};
use crate::diagnostics::context::ProbeContext;

/// Presence of one required `KEY=value` fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentCheck {
    /// Text before the first `=`
    pub key: String,
    pub present: bool,
}

/// Key part of a `KEY=value` fragment
pub fn fragment_key(fragment: &str) -> &str {
    fragment.split('=').next().unwrap_or(fragment)
}

/// Checks each fragment for plain substring containment
pub fn check_required_fragments(content: &str, fragments: &[String]) -> Vec<FragmentCheck> {
    fragments
        .iter()
        .map(|fragment| FragmentCheck {
            key: fragment_key(fragment).to_string(),
            present: content.contains(fragment.as_str()),
        })
        .collect()
}

/// Forbidden fragments that occur in `content`
pub fn find_forbidden<'a>(content: &str, fragments: &'a [String]) -> Vec<&'a str> {
    fragments
        .iter()
        .filter(|fragment| content.contains(fragment.as_str()))
        .map(String::as_str)
        .collect()
}

/// Reads a file if it exists; `Ok(None)` when it does not
fn read_optional(path: &Path) -> io::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(path).map(Some)
}

#[derive(Debug, Default)]
struct Findings {
    critical: Vec<String>,
    missing: Vec<String>,
}

/// Validates the env file and compose file in the working directory
pub struct EnvironmentCheck;

impl EnvironmentCheck {
    pub fn new() -> Self {
        Self
    }

    fn check_env_file(&self, ctx: &ProbeContext, findings: &mut Findings) {
        let env = &ctx.config.environment;
        let name = env.env_file.display().to_string();

        match read_optional(&env.env_file) {
            Ok(Some(content)) => {
                ctx.say(format!("✅ {} file found", name));
                for check in check_required_fragments(&content, &env.required_fragments) {
                    if check.present {
                        ctx.say(format!("✅ {} is configured", check.key));
                    } else {
                        ctx.say(format!("❌ {} not found or incorrect", check.key));
                        findings.missing.push(check.key);
                    }
                }
            }
            Ok(None) => {
                ctx.say(format!("❌ {} file not found", name));
                findings.missing.push(name);
            }
            Err(e) => {
                ctx.say(format!("❌ Error reading {} file: {}", name, e));
                findings.missing.push(name);
            }
        }
    }

    fn check_compose_file(&self, ctx: &ProbeContext, findings: &mut Findings) {
        let env = &ctx.config.environment;
        let name = env.compose_file.display().to_string();

        match read_optional(&env.compose_file) {
            Ok(Some(content)) => {
                ctx.say(format!("✅ {} found", name));
                let forbidden = find_forbidden(&content, &env.forbidden_fragments);
                if forbidden.is_empty() {
                    ctx.say("✅ No problematic file references found");
                }
                for fragment in forbidden {
                    ctx.say(format!("❌ CRITICAL: {} reference still present!", fragment));
                    findings.critical.push(fragment.to_string());
                }
            }
            Ok(None) => {
                ctx.say(format!("❌ {} not found", name));
                findings.missing.push(name);
            }
            Err(e) => {
                ctx.say(format!("❌ Error reading {}: {}", name, e));
                findings.missing.push(name);
            }
        }
    }
}

impl Default for EnvironmentCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemCheck for EnvironmentCheck {
    fn name(&self) -> &'static str {
        "Environment"
    }

    fn banner(&self) -> &'static str {
        "⚙️  ENVIRONMENT CONFIGURATION"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Required .env keys and known-bad compose references")
    }

    async fn check(&self, ctx: &ProbeContext) -> CheckResult {
        let mut findings = Findings::default();
        self.check_env_file(ctx, &mut findings);
        self.check_compose_file(ctx, &mut findings);

        if !findings.critical.is_empty() {
            CheckResult::fail(format!(
                "critical reference present: {}",
                findings.critical.join(", ")
            ))
        } else if !findings.missing.is_empty() {
            CheckResult::warn(format!("missing: {}", findings.missing.join(", ")))
        } else {
            CheckResult::pass("configuration files look correct")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FORBIDDEN_COMPOSE_FRAGMENTS, REQUIRED_ENV_FRAGMENTS};

    fn required() -> Vec<String> {
        REQUIRED_ENV_FRAGMENTS.iter().map(|s| s.to_string()).collect()
    }

    fn forbidden() -> Vec<String> {
        FORBIDDEN_COMPOSE_FRAGMENTS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_fragments_present() {
        let content = "DB_USER=pfmt_user\nDB_NAME=pfmt_integrated\nDB_PASSWORD=somevalue\n";
        let checks = check_required_fragments(content, &required());

        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.present));
    }

    #[test]
    fn test_missing_db_name_is_the_only_absent_key() {
        let content = "DB_USER=pfmt_user\nDB_PASSWORD=somevalue\n";
        let absent: Vec<_> = check_required_fragments(content, &required())
            .into_iter()
            .filter(|c| !c.present)
            .map(|c| c.key)
            .collect();

        assert_eq!(absent, vec!["DB_NAME"]);
    }

    #[test]
    fn test_wrong_value_counts_as_absent() {
        let content = "DB_USER=postgres\nDB_NAME=pfmt_integrated\nDB_PASSWORD=\n";
        let checks = check_required_fragments(content, &required());

        assert!(!checks[0].present);
        assert!(checks[1].present);
        // Key-only fragment just needs the key to be set
        assert!(checks[2].present);
    }

    #[test]
    fn test_fragment_key() {
        assert_eq!(fragment_key("DB_USER=pfmt_user"), "DB_USER");
        assert_eq!(fragment_key("DB_PASSWORD="), "DB_PASSWORD");
        assert_eq!(fragment_key("NOEQUALS"), "NOEQUALS");
    }

    #[test]
    fn test_compose_regression_marker() {
        let bad = "volumes:\n  - ./fix_uuid_schema.sql:/docker-entrypoint-initdb.d/02.sql\n";
        assert_eq!(find_forbidden(bad, &forbidden()), vec!["fix_uuid_schema.sql"]);

        let clean = "volumes:\n  - ./init.sql:/docker-entrypoint-initdb.d/01.sql\n";
        assert!(find_forbidden(clean, &forbidden()).is_empty());
    }
}
