//! Report preview server
//!
//! Renders report previews for the designer and keeps the generated PDFs in
//! a short-lived in-memory cache so they can be fetched again by key.

use preview_render::SimpleRenderer;
use preview_server::{start_server, Config, PreviewService, Result, ServerState, SharedState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("preview_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting report preview server...");

    let config = Config::from_env();
    info!("Port: {}", config.port);
    info!("Path: {}", config.path);
    info!("Static dir: {:?}", config.static_dir);
    info!(
        "Max cache size: {} MB",
        config.max_cache_size / (1024 * 1024)
    );
    info!(
        "Retention: {} seconds ({} seconds under size pressure)",
        config.retention_secs, config.pressure_retention_secs
    );

    let service = PreviewService::new(Arc::new(SimpleRenderer::new()), config.eviction_policy());
    let state: SharedState = Arc::new(ServerState::new(service));

    // Start HTTP server (blocking)
    start_server(state, &config).await?;

    Ok(())
}
