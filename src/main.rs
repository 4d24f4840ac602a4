//! Command-line entry point: ingest configuration from files, the process
//! environment and `-D` overrides, wire an (otherwise empty, until extended)
//! bean container, and drive a small heartbeat runner until shutdown.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use weave::container::BeanContainer;
use weave::error::WeaveError;
use weave::ingest::EnvOptions;
use weave::logger::{self, Logger};
use weave::runner::{run_app, AppRunner, ConfigSource, IngestPlan, RunnerContext};

static LOG: Logger = Logger::new("main");

/// Ingests configuration and runs the wired application until interrupted.
#[derive(Parser, Debug)]
#[command(
    name = "weave",
    about = "Property binding, dynamic values, and bean container wiring"
)]
struct Cli {
    /// Configuration file to ingest, lowest priority first. A `.json`
    /// extension decodes as JSON; anything else as `.properties`.
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    config: Vec<PathBuf>,

    /// Prefix stripped from imported environment variables, e.g.
    /// `GS_DB_URL` becomes `db.url`.
    #[arg(long = "env-prefix", default_value = "GS_")]
    env_prefix: String,

    /// Active profile, consulted by `OnProfile` bean conditions.
    #[arg(long, default_value = "default")]
    profile: String,

    /// `-D key=value` / `-D key` overrides, highest priority, passed through
    /// verbatim to the override parser (space-separated, not attached).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    overrides: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let cli = Cli::parse();

    let mut sources = Vec::new();
    for path in &cli.config {
        let raw = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("properties")
            .to_string();
        sources.push(ConfigSource {
            prefix: String::new(),
            raw,
            ext,
        });
    }

    LOG.info(&format!(
        "weave starting: profile={}, config_files={}, env_prefix={}",
        cli.profile,
        cli.config.len(),
        cli.env_prefix
    ));

    let plan = IngestPlan {
        sources,
        env: Some(EnvOptions {
            prefix: cli.env_prefix.clone(),
            ..Default::default()
        }),
        cmdline_args: cli.overrides.clone(),
        ..Default::default()
    };

    let container = BeanContainer::new(cli.profile.clone());
    let runners: Vec<Arc<dyn AppRunner>> = vec![Arc::new(HeartbeatRunner)];
    run_app(&plan, container, runners).await?;
    Ok(())
}

/// Logs a line every `heartbeat.interval_secs` (default 30) until shutdown.
/// Demonstrates the runner contract; real applications register their own.
struct HeartbeatRunner;

impl AppRunner for HeartbeatRunner {
    fn run<'a>(
        &'a self,
        mut ctx: RunnerContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), WeaveError>> + Send + 'a>> {
        Box::pin(async move {
            let interval_secs: u64 = ctx
                .properties
                .has("heartbeat.interval_secs")
                .then(|| ctx.properties.get("heartbeat.interval_secs"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(30);

            let mut ticks: u64 = 0;
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {
                        ticks += 1;
                        LOG.info(&format!("heartbeat #{ticks}"));
                    }
                    _ = ctx.shutdown_signal() => {
                        LOG.info("heartbeat stopping");
                        return Ok(());
                    }
                }
            }
        })
    }
}
