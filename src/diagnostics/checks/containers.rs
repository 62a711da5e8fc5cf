//! Docker Compose availability, container status and recent logs

use async_trait::async_trait;

use crate::config::ComposeConfig;
use crate::diagnostics::check::{CheckResult, CheckStatus, SystemCheck};
use crate::diagnostics::context::ProbeContext;
use crate::probe::CommandSpec;

/// The two ways Docker Compose can be invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCli {
    /// The standalone `docker-compose` binary
    Standalone,
    /// The `docker compose` CLI plugin
    Plugin,
}

impl ComposeCli {
    /// Command that reports the tool's version
    pub fn version_command(self, compose: &ComposeConfig) -> CommandSpec {
        match self {
            ComposeCli::Standalone => CommandSpec::new(&compose.compose_bin, ["--version"]),
            ComposeCli::Plugin => CommandSpec::new(&compose.docker_bin, ["compose", "version"]),
        }
    }

    /// Command that lists the project's containers
    pub fn ps_command(self, compose: &ComposeConfig) -> CommandSpec {
        match self {
            ComposeCli::Standalone => CommandSpec::new(&compose.compose_bin, ["ps"]),
            ComposeCli::Plugin => CommandSpec::new(&compose.docker_bin, ["compose", "ps"]),
        }
    }

    pub fn other(self) -> Self {
        match self {
            ComposeCli::Standalone => ComposeCli::Plugin,
            ComposeCli::Plugin => ComposeCli::Standalone,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ComposeCli::Standalone => "docker-compose",
            ComposeCli::Plugin => "docker compose plugin",
        }
    }
}

/// Checks that Docker Compose works, then lists containers and their logs
pub struct ContainerStatusCheck;

impl ContainerStatusCheck {
    pub fn new() -> Self {
        Self
    }

    /// Returns the first compose CLI form that answers its version command
    async fn detect_cli(&self, ctx: &ProbeContext) -> Option<ComposeCli> {
        let compose = &ctx.config.compose;
        let standalone = ComposeCli::Standalone;
        if ctx
            .run_command(
                &standalone.version_command(compose),
                "Checking docker-compose availability",
            )
            .await
            .success()
        {
            return Some(standalone);
        }

        let plugin = ComposeCli::Plugin;
        if ctx
            .run_command(&plugin.version_command(compose), "Checking docker compose plugin")
            .await
            .success()
        {
            return Some(plugin);
        }

        None
    }
}

impl Default for ContainerStatusCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemCheck for ContainerStatusCheck {
    fn name(&self) -> &'static str {
        "Containers"
    }

    fn banner(&self) -> &'static str {
        "🐳 DOCKER CONTAINER STATUS"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Docker Compose availability, container status and recent logs")
    }

    async fn check(&self, ctx: &ProbeContext) -> CheckResult {
        let Some(cli) = self.detect_cli(ctx).await else {
            ctx.say("❌ Docker Compose not available - cannot check container status");
            return CheckResult::fail("Docker Compose not available");
        };

        let compose = &ctx.config.compose;
        let mut listed = ctx
            .run_command(&cli.ps_command(compose), "Checking container status")
            .await
            .success();
        if !listed {
            let fallback = cli.other();
            listed = ctx
                .run_command(
                    &fallback.ps_command(compose),
                    &format!("Checking container status ({})", fallback.label()),
                )
                .await
                .success();
        }

        let containers = &compose.status_containers;
        let tail = compose.status_log_tail;
        let mut failed_logs = Vec::new();
        for container in containers {
            let result = ctx
                .run_command(
                    &CommandSpec::docker_logs(&compose.docker_bin, container, tail),
                    &format!("Checking {} logs", container),
                )
                .await;
            if !result.success() {
                failed_logs.push(container.as_str());
            }
        }

        let mut problems = Vec::new();
        if !listed {
            problems.push("container listing failed".to_string());
        }
        if !failed_logs.is_empty() {
            problems.push(format!("no logs for {}", failed_logs.join(", ")));
        }

        let message = if problems.is_empty() {
            format!("{} available, {} containers logged", cli.label(), containers.len())
        } else {
            format!("{} available; {}", cli.label(), problems.join("; "))
        };
        let status = if problems.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Warn
        };

        CheckResult::with_status(status, message)
    }
}
