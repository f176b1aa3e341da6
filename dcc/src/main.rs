//! Deploy Convergence Checker - CLI entry point.
//!
//! Parses the pipeline-facing flag/env surface, wires the HTTP platform
//! client into the poll scheduler, and maps the outcome to the process
//! exit code: zero only when the deployment converged.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dcc::evaluate::{EvaluationPolicy, LabelMatch};
use dcc::platform::{Credentials, PlatformClient, QueryMode};
use dcc::scheduler::PollScheduler;
use dcc_common::{DeployTarget, TimeoutBudget};

#[derive(Parser, Debug)]
#[command(name = "dcc")]
#[command(author, version, about = "Deploy convergence checker - waits for a deployment to go healthy")]
struct Cli {
    /// Platform access key; falls back to ambient runner credentials
    #[arg(long, env = "PLUGIN_ACCESS_KEY")]
    access_key: Option<String>,

    /// Platform secret key; falls back to ambient runner credentials
    #[arg(long, env = "PLUGIN_SECRET_KEY")]
    secret_key: Option<String>,

    /// Application name on the platform
    #[arg(long, env = "PLUGIN_APPLICATION")]
    application: String,

    /// Environment name; omit to check every environment of the application
    #[arg(long, env = "PLUGIN_ENVIRONMENT")]
    environment: Option<String>,

    /// Version label the deployment must converge to
    #[arg(long, env = "PLUGIN_VERSION_LABEL")]
    version_label: String,

    /// Platform region
    #[arg(long, env = "PLUGIN_REGION", default_value = "us-east-1")]
    region: String,

    /// Management API base URL; defaults to the region-scoped host
    #[arg(long, env = "PLUGIN_ENDPOINT")]
    endpoint: Option<String>,

    /// Total wall-clock budget for the check (e.g. "30m", "90s")
    #[arg(long, env = "PLUGIN_TIMEOUT", default_value = "30m", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Interval between polls (e.g. "20s")
    #[arg(long, env = "PLUGIN_TICK", default_value = "20s", value_parser = humantime::parse_duration)]
    tick: Duration,

    /// Query mode: environment status or application-version processing
    #[arg(long, env = "PLUGIN_MODE", value_enum, default_value_t = QueryMode::Environment)]
    mode: QueryMode,

    /// Version label comparison; prefix matching can false-positive when
    /// one label prefixes another, so it is opt-in
    #[arg(long, env = "PLUGIN_MATCH_MODE", value_enum, default_value_t = LabelMatch::Exact)]
    match_mode: LabelMatch,

    /// Enable debug-level logging (per-tick trace)
    #[arg(long, env = "PLUGIN_DEBUG")]
    debug: bool,

    /// Emit JSON log lines for pipeline log aggregation
    #[arg(long, env = "PLUGIN_LOG_JSON")]
    log_json: bool,
}

fn init_logging(debug: bool, json: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_json);

    let budget = TimeoutBudget::new(cli.timeout, cli.tick)?;
    let target = DeployTarget::new(
        cli.application,
        cli.environment,
        cli.version_label,
        cli.region,
    )?;

    match &target.environment {
        Some(environment) => info!(
            region = %target.region,
            app = %target.application,
            env = %environment,
            label = %target.version_label,
            timeout = %humantime::format_duration(budget.total),
            tick = %humantime::format_duration(budget.tick),
            "attempting to check for a successful deploy"
        ),
        None => info!(
            region = %target.region,
            app = %target.application,
            label = %target.version_label,
            timeout = %humantime::format_duration(budget.total),
            tick = %humantime::format_duration(budget.tick),
            "attempting to check for a successful deploy"
        ),
    }

    let endpoint = cli
        .endpoint
        .unwrap_or_else(|| PlatformClient::default_endpoint(&target.region));
    let credentials = Credentials::resolve(cli.access_key, cli.secret_key);
    let client = PlatformClient::new(endpoint, cli.mode, credentials);

    let policy = match cli.mode {
        QueryMode::Environment => EvaluationPolicy::Environment {
            label_match: cli.match_mode,
        },
        QueryMode::Version => EvaluationPolicy::Version,
    };

    let scheduler = PollScheduler::new(client, policy, budget);
    scheduler.run(&target).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_pipeline_contract() {
        let cli = Cli::try_parse_from([
            "dcc",
            "--application",
            "orders-api",
            "--version-label",
            "v42",
        ])
        .unwrap();

        assert_eq!(cli.region, "us-east-1");
        assert_eq!(cli.timeout, Duration::from_secs(30 * 60));
        assert_eq!(cli.tick, Duration::from_secs(20));
        assert_eq!(cli.mode, QueryMode::Environment);
        assert_eq!(cli.match_mode, LabelMatch::Exact);
        assert!(!cli.debug);
        assert!(cli.environment.is_none());
    }

    #[test]
    fn test_malformed_duration_is_rejected_before_the_loop() {
        let err = Cli::try_parse_from([
            "dcc",
            "--application",
            "orders-api",
            "--version-label",
            "v42",
            "--timeout",
            "thirty minutes",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_application_is_required() {
        let err = Cli::try_parse_from(["dcc", "--version-label", "v42"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_mode_and_match_mode_parse_their_variants() {
        let cli = Cli::try_parse_from([
            "dcc",
            "--application",
            "orders-api",
            "--version-label",
            "v42",
            "--mode",
            "version",
            "--match-mode",
            "prefix",
        ])
        .unwrap();
        assert_eq!(cli.mode, QueryMode::Version);
        assert_eq!(cli.match_mode, LabelMatch::Prefix);
    }
}
