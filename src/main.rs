//! FairML Predictor server
//!
//! Loads the scorer artifacts once, then serves predictions and fairness
//! audits over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fairml_predictor::{config::Config, create_router, model::ModelRegistry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fairml_predictor=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("FairML Predictor starting ({})...", config.environment);

    // Load models
    let models = ModelRegistry::load_dir(&config.models_dir)
        .with_context(|| format!("failed to load models from {}", config.models_dir.display()))?;

    // Build application state
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(models, config);

    // Build router
    let app = create_router(state);

    // Start server
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
