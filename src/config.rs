//! Diagnostic configuration
//!
//! The fixed probe tables live here as constants. [`DiagnosticConfig`] starts
//! from them and can be layered with a config file and environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Project directory the tool switches into when it exists
pub const DEFAULT_PROJECT_DIR: &str = "/home/ubuntu/pfmt_complete_application";

/// Per-command and per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3002";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

pub const DEFAULT_DOCKER_BIN: &str = "docker";
pub const DEFAULT_COMPOSE_BIN: &str = "docker-compose";

/// Containers whose recent logs are shown during the status check
pub const STATUS_CONTAINERS: [&str; 3] = ["pfmt-postgres", "pfmt-backend", "pfmt-frontend"];

/// Containers whose logs are scanned for error signatures
pub const LOG_CONTAINERS: [&str; 3] = ["pfmt-backend", "pfmt-postgres", "pfmt-frontend"];

pub const DB_CONTAINER: &str = "pfmt-postgres";
pub const DB_USER: &str = "pfmt_user";
pub const DB_NAME: &str = "pfmt_integrated";
pub const DB_TABLES: [&str; 2] = ["project_templates", "project_wizard_sessions"];

/// Known failure signatures, matched case-insensitively against log text
pub const ERROR_SIGNATURES: [&str; 9] = [
    "role \"pfmt_user\" does not exist",
    "password authentication failed",
    "connection refused",
    "ECONNREFUSED",
    "Error initializing wizard",
    "Failed to initialize project wizard",
    "Cannot connect to database",
    "FATAL:",
    "ERROR:",
];

/// Fragments that must appear in the env file. A trailing `=` only checks
/// that the key is set.
pub const REQUIRED_ENV_FRAGMENTS: [&str; 3] =
    ["DB_USER=pfmt_user", "DB_NAME=pfmt_integrated", "DB_PASSWORD="];

/// References that must no longer appear in the compose file
pub const FORBIDDEN_COMPOSE_FRAGMENTS: [&str; 1] = ["fix_uuid_schema.sql"];

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Docker Compose inspection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Docker CLI used for `logs`, `exec` and the `compose` plugin
    pub docker_bin: String,
    /// Standalone Docker Compose binary
    pub compose_bin: String,
    /// Containers whose logs are tailed after `ps`
    pub status_containers: Vec<String>,
    /// Number of log lines shown per container
    pub status_log_tail: u32,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
            compose_bin: DEFAULT_COMPOSE_BIN.to_string(),
            status_containers: to_strings(&STATUS_CONTAINERS),
            status_log_tail: 20,
        }
    }
}

/// Database probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub container: String,
    pub user: String,
    pub name: String,
    /// Tables whose row counts are queried
    pub tables: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            container: DB_CONTAINER.to_string(),
            user: DB_USER.to_string(),
            name: DB_NAME.to_string(),
            tables: to_strings(&DB_TABLES),
        }
    }
}

/// Configuration file checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub env_file: PathBuf,
    pub compose_file: PathBuf,
    pub required_fragments: Vec<String>,
    pub forbidden_fragments: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            compose_file: PathBuf::from("docker-compose.yml"),
            required_fragments: to_strings(&REQUIRED_ENV_FRAGMENTS),
            forbidden_fragments: to_strings(&FORBIDDEN_COMPOSE_FRAGMENTS),
        }
    }
}

/// Log analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub containers: Vec<String>,
    /// Number of log lines scanned per container
    pub tail: u32,
    pub signatures: Vec<String>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            containers: to_strings(&LOG_CONTAINERS),
            tail: 50,
            signatures: to_strings(&ERROR_SIGNATURES),
        }
    }
}

/// Full diagnostic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Directory to run from when it exists
    pub project_dir: PathBuf,
    /// Timeout applied to every command and HTTP request
    pub timeout_secs: u64,
    /// Backend base URL, without trailing slash
    pub backend_url: String,
    /// Frontend root URL
    pub frontend_url: String,
    pub compose: ComposeConfig,
    pub database: DatabaseConfig,
    pub environment: EnvironmentConfig,
    pub logs: LogsConfig,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from(DEFAULT_PROJECT_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            compose: ComposeConfig::default(),
            database: DatabaseConfig::default(),
            environment: EnvironmentConfig::default(),
            logs: LogsConfig::default(),
        }
    }
}

impl DiagnosticConfig {
    /// Loads configuration layered over the built-in defaults
    ///
    /// Sources, lowest priority first:
    /// 1. Built-in defaults
    /// 2. `config/diagnose.toml` if present, or `path` (which must exist)
    /// 3. Environment variables with prefix `PFMT_DIAG_`, nested keys joined
    ///    with `__` (e.g. `PFMT_DIAG_DATABASE__USER=admin`)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("config/diagnose").required(false)),
        };

        let config = builder
            .add_source(
                Environment::with_prefix("PFMT_DIAG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins a path onto the backend base URL
    pub fn backend_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), path)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_fixed_tables() {
        let config = DiagnosticConfig::default();

        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.database.name, "pfmt_integrated");
        assert_eq!(config.database.user, "pfmt_user");
        assert_eq!(config.logs.signatures.len(), 9);
        assert_eq!(config.logs.tail, 50);
        assert_eq!(config.compose.status_log_tail, 20);
        assert_eq!(config.logs.containers[0], "pfmt-backend");
        assert_eq!(config.compose.status_containers[0], "pfmt-postgres");
        assert_eq!(config.compose.docker_bin, "docker");
        assert_eq!(config.compose.compose_bin, "docker-compose");
    }

    #[test]
    fn test_backend_endpoint_joins_paths() {
        let mut config = DiagnosticConfig::default();
        assert_eq!(
            config.backend_endpoint("/api/health"),
            "http://localhost:3002/api/health"
        );

        config.backend_url = "http://backend:9000/".to_string();
        assert_eq!(config.backend_endpoint("/health"), "http://backend:9000/health");
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "timeout_secs = 5\nbackend_url = \"http://example:1234\"\n\n\
             [compose]\ndocker_bin = \"/usr/local/bin/podman\"\n\n[database]\nuser = \"admin\""
        )
        .unwrap();

        let config = DiagnosticConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.backend_url, "http://example:1234");
        assert_eq!(config.database.user, "admin");
        assert_eq!(config.compose.docker_bin, "/usr/local/bin/podman");
        assert_eq!(config.compose.compose_bin, "docker-compose");
        // Untouched keys keep their defaults
        assert_eq!(config.database.name, "pfmt_integrated");
        assert_eq!(config.logs.signatures.len(), 9);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = DiagnosticConfig::load(Some(Path::new("/nonexistent/diagnose.toml")));
        assert!(result.is_err());
    }
}
