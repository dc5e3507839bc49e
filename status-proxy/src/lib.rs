pub mod api;
pub mod config;
pub mod graphql;
pub mod metrics_defs;
pub mod types;
pub mod upstream;

use api::AppState;
use config::Config;
use std::sync::Arc;
use upstream::RailwayClient;

#[derive(thiserror::Error, Debug)]
pub enum StatusProxyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("already inside a tokio runtime, use serve() directly")]
    NestedRuntime,
}

pub fn run(config: Config) -> Result<(), StatusProxyError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(StatusProxyError::NestedRuntime);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(serve(config))
}

pub async fn serve(config: Config) -> Result<(), StatusProxyError> {
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    tracing::info!(upstream = %config.upstream.url, "Starting status proxy");

    let client = RailwayClient::new(&config.upstream);
    let state = AppState::new(Arc::new(client), config.api.strict_status);

    api::serve(&config.listener, state).await?;
    Ok(())
}
