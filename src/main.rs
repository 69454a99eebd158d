//! TherapyConnect - web front-end for the therapy-booking platform

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use therapyconnect::{
    backend::BackendClient,
    config::Config,
    flow::InFlightCancels,
    render::TemplateEngine,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "therapyconnect=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TherapyConnect...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Backend API client
    let backend = BackendClient::new(&config.backend.base_url);
    tracing::info!("Backend API: {}", config.backend.base_url);

    // Template engine over the embedded templates
    let templates = Arc::new(TemplateEngine::new()?);
    tracing::info!("Template engine initialized");

    // Build application state
    let state = AppState {
        backend,
        templates,
        auth_config: Arc::new(config.auth.clone()),
        upload_config: Arc::new(config.upload.clone()),
        cancels: InFlightCancels::new(),
    };

    // Build router
    let app = web::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
