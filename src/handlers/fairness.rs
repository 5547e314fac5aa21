//! Fairness handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::fairness::{AuditRecord, FairnessResult, GroupAudit, ProtectedAttribute};
use super::AppJson;
use crate::profile::UserProfile;
use crate::{AppResult, AppState};

/// Sex and race counterfactuals of one profile
pub async fn analyze(
    State(state): State<AppState>,
    AppJson(profile): AppJson<UserProfile>,
) -> AppResult<Json<FairnessResult>> {
    profile.validate()?;

    let result = state.predictor.analyze_fairness(&profile)?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct AuditGroupsRequest {
    pub attribute: ProtectedAttribute,
    pub records: Vec<AuditRecord>,
}

/// Group rates of the classifier over a labelled batch
pub async fn audit_groups(
    State(state): State<AppState>,
    AppJson(req): AppJson<AuditGroupsRequest>,
) -> AppResult<Json<GroupAudit>> {
    for record in &req.records {
        record.profile.validate()?;
    }

    let audit = state.predictor.audit_groups(req.attribute, &req.records)?;
    Ok(Json(audit))
}
