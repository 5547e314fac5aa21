//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    models_loaded: usize,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models_loaded = state
        .predictor
        .registry()
        .status()
        .models
        .iter()
        .filter(|m| m.loaded)
        .count();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        models_loaded,
    })
}
