use std::sync::Arc;

use anyhow::Context;

use gearcage_api::app::{self, services::GearService};
use gearcage_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gearcage_observability::init();

    let config = ApiConfig::from_env();

    let services = GearService::open(&config.inventory_file).with_context(|| {
        format!("failed to load inventory from {}", config.inventory_file.display())
    })?;

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
