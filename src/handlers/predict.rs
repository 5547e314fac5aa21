//! Prediction handlers

use axum::{extract::State, Json};
use validator::Validate;

use crate::predict::{ClassificationResult, PointEstimate, RangeEstimate};
use super::AppJson;
use crate::profile::UserProfile;
use crate::{AppResult, AppState};

/// Salary class from the UCI classifier
pub async fn classify(
    State(state): State<AppState>,
    AppJson(profile): AppJson<UserProfile>,
) -> AppResult<Json<ClassificationResult>> {
    profile.validate()?;
    tracing::debug!("Received user profile for classification: {:?}", profile);

    let result = state.predictor.classify(&profile)?;
    Ok(Json(result))
}

/// Point salary estimate from the ACS regressor
pub async fn salary(
    State(state): State<AppState>,
    AppJson(profile): AppJson<UserProfile>,
) -> AppResult<Json<PointEstimate>> {
    profile.validate()?;
    tracing::debug!("Received user profile for regression: {:?}", profile);

    let result = state.predictor.estimate(&profile)?;
    Ok(Json(result))
}

/// Quantile salary range from the ACS quantile regressors
pub async fn salary_range(
    State(state): State<AppState>,
    AppJson(profile): AppJson<UserProfile>,
) -> AppResult<Json<RangeEstimate>> {
    profile.validate()?;
    tracing::debug!("Received user profile for range estimate: {:?}", profile);

    let result = state.predictor.estimate_range(&profile)?;
    Ok(Json(result))
}
