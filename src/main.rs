use anyhow::{Context, Result};
use std::sync::Arc;

use heatguard_core::Config;
use heatguard_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    heatguard_core::init()?;

    let (config, _warnings) = Config::load_validated().context("Failed to load configuration")?;

    let state = Arc::new(AppState::from_config(&config)?);
    let addr = heatguard_server::resolve_addr(&config.server.host, config.server.port).await?;

    tracing::info!("Heatguard starting");

    heatguard_server::serve(state, addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    })
    .await
}
