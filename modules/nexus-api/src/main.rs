use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nexus_api::{router, AppState};
use nexus_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nexus=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let app = router(Arc::new(AppState::from_config(config)));

    info!("Nexus API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
