//! Model status handler

use axum::{extract::State, Json};

use crate::model::RegistryStatus;
use crate::AppState;

/// Which scorers are loaded, with their schema layout hashes
pub async fn status(State(state): State<AppState>) -> Json<RegistryStatus> {
    Json(state.predictor.registry().status())
}
