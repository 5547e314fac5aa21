//! FairML Predictor
//!
//! Salary predictions and counterfactual fairness diagnostics over the ACS
//! income survey and the UCI Adult dataset.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      FAIRML PREDICTOR                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  UserProfile ──► FeatureMapper ──► FeatureVector ──► Scorer  │
//! │                   (per schema)      (layout hash)     (Arc)  │
//! │                                                              │
//! │  FairnessEvaluator: {identity, sex flip, race swap} ► gaps   │
//! │  ModelRegistry:     artifacts loaded once from MODELS_DIR    │
//! │  Router (Axum):     /predict, /predict_salary, ...           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod fairness;
pub mod features;
pub mod handlers;
pub mod model;
pub mod predict;
pub mod profile;
pub mod survey;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

use features::Mappers;
use model::ModelRegistry;
use predict::Predictor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub config: config::Config,
}

impl AppState {
    pub fn new(registry: ModelRegistry, config: config::Config) -> Self {
        Self {
            predictor: Predictor::new(Arc::new(registry), Arc::new(Mappers::default())),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/models", get(handlers::models::status))
        .route("/predict", post(handlers::predict::classify))
        .route("/predict_salary", post(handlers::predict::salary))
        .route("/predict_salary_range", post(handlers::predict::salary_range))
        .route("/analyze_fairness", post(handlers::fairness::analyze))
        .route("/audit_groups", post(handlers::fairness::audit_groups))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
