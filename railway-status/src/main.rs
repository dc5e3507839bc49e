use clap::Parser;
use metrics_exporter_statsd::StatsdBuilder;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{Config, ConfigError, LoggingConfig, MetricsConfig};

const METRICS_PREFIX: &str = "railway_status";

#[derive(Parser)]
#[command(version, about = "REST proxy for Railway service deployment status")]
enum CliCommand {
    /// Serve the status endpoints
    Run {
        /// Path to a YAML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum MainError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid sentry DSN: {0}")]
    SentryDsn(#[from] sentry::types::ParseDsnError),
    #[error("statsd error: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),
    #[error("a metrics recorder is already installed")]
    RecorderInstalled,
    #[error(transparent)]
    StatusProxy(#[from] status_proxy::StatusProxyError),
}

fn main() -> Result<(), MainError> {
    let cli = CliCommand::parse();

    match cli {
        CliCommand::Run { config } => run(config.as_deref()),
    }
}

fn run(config_path: Option<&Path>) -> Result<(), MainError> {
    let config = Config::load(config_path)?;

    // Keep the guard alive for the lifetime of the process so events are flushed on exit.
    let sentry_guard = config.common.logging.as_ref().map(init_sentry).transpose()?;
    init_tracing(sentry_guard.is_some());

    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    let port = std::env::var("PORT").ok();
    let status_config = config.status.with_port_override(port.as_deref());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting railway-status"
    );
    status_proxy::run(status_config)?;

    Ok(())
}

fn init_sentry(config: &LoggingConfig) -> Result<sentry::ClientInitGuard, MainError> {
    let dsn: sentry::types::Dsn = config.sentry_dsn.parse()?;

    Ok(sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        ..Default::default()
    }))
}

fn init_tracing(with_sentry: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(with_sentry.then(|| sentry::integrations::tracing::layer()))
        .init();
}

fn init_metrics(config: &MetricsConfig) -> Result<(), MainError> {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(METRICS_PREFIX))?;

    metrics::set_global_recorder(recorder).map_err(|_| MainError::RecorderInstalled)?;

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
