use std::sync::Arc;

use anyhow::Context;

use depot_infra::{AppConfig, WarehouseEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    depot_observability::init(&config.log);

    let engine = Arc::new(WarehouseEngine::new(config.engine.clone()));
    let app = depot_api::app::build_app(engine);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        default_warehouse = %config.engine.default_warehouse,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
