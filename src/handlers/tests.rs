//! Router tests
//!
//! Drive the full axum router with stub scorers in the registry.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::features::{FeatureValue, FeatureVector, SchemaKind};
use crate::model::{FnScorer, ModelRegistry, ModelRole};
use crate::{create_router, AppState};

fn has_text(f: &FeatureVector, name: &str, value: &str) -> bool {
    f.get(name) == Some(&FeatureValue::from(value))
}

fn full_registry() -> ModelRegistry {
    ModelRegistry::empty()
        .with(
            ModelRole::Classifier,
            Arc::new(FnScorer::new(SchemaKind::Classification, |f: &FeatureVector| {
                if has_text(f, "sex", "Male") { 0.8 } else { 0.3 }
            })),
        )
        .unwrap()
        .with(
            ModelRole::Regressor,
            Arc::new(FnScorer::new(SchemaKind::Regression, |_| 72_000.0)),
        )
        .unwrap()
        .with(
            ModelRole::QuantileLower,
            Arc::new(FnScorer::new(SchemaKind::Range, |_| 60_000.0)),
        )
        .unwrap()
        .with(
            ModelRole::QuantileMedian,
            Arc::new(FnScorer::new(SchemaKind::Range, |f: &FeatureVector| {
                if has_text(f, "SEX", "1") { 100_000.0 } else { 90_000.0 }
            })),
        )
        .unwrap()
        .with(
            ModelRole::QuantileUpper,
            Arc::new(FnScorer::new(SchemaKind::Range, |_| 80_000.0)),
        )
        .unwrap()
}

fn app(registry: ModelRegistry) -> Router {
    create_router(AppState::new(registry, Config::default()))
}

fn profile_json() -> Value {
    json!({
        "age": 35,
        "education_level": "Bachelors",
        "work_class": "Private",
        "marital_status": "Married-civ-spouse",
        "sex": "Male",
        "race": "White",
        "major": "Computer Science",
        "native_country": "United-States"
    })
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(full_registry()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_loaded"], 5);
}

#[tokio::test]
async fn test_models_lists_every_role() {
    let (status, body) = get(app(ModelRegistry::empty()), "/models").await;
    assert_eq!(status, StatusCode::OK);

    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 5);
    assert!(models.iter().all(|m| m["loaded"] == false));
}

#[tokio::test]
async fn test_predict_classification() {
    let (status, body) = post(app(full_registry()), "/predict", profile_json()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], ">50k");
    assert_eq!(body["confidence"], 0.8);
}

#[tokio::test]
async fn test_predict_salary() {
    let (status, body) = post(app(full_registry()), "/predict_salary", profile_json()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], 72_000.0);
}

#[tokio::test]
async fn test_predict_salary_range_is_ordered() {
    let (status, body) = post(app(full_registry()), "/predict_salary_range", profile_json()).await;
    assert_eq!(status, StatusCode::OK);

    // the upper stub sits below the median and gets pulled up to it
    assert_eq!(body["lower_bound"], 60_000.0);
    assert_eq!(body["median"], 100_000.0);
    assert_eq!(body["upper_bound"], 100_000.0);
}

#[tokio::test]
async fn test_analyze_fairness() {
    let (status, body) = post(app(full_registry()), "/analyze_fairness", profile_json()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original"], 100_000.0);
    assert_eq!(body["gender_counterfactual"], 90_000.0);
    assert_eq!(body["race_counterfactual"], 100_000.0);
    assert_eq!(body["gender_gap_percent"], -10.0);
    assert_eq!(body["race_gap_percent"], 0.0);
}

#[tokio::test]
async fn test_occupation_category_alias() {
    let mut profile = profile_json();
    let major = profile["major"].take();
    profile.as_object_mut().unwrap().remove("major");
    profile["occupation_category"] = major;

    let (status, _) = post(app(full_registry()), "/analyze_fairness", profile).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_model_is_unavailable() {
    let (status, body) = post(app(ModelRegistry::empty()), "/predict_salary_range", profile_json()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_invalid_age_is_rejected() {
    let mut profile = profile_json();
    profile["age"] = json!(0);

    let (status, body) = post(app(full_registry()), "/predict", profile).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_audit_groups() {
    let mut woman = profile_json();
    woman["sex"] = json!("Female");

    let request = json!({
        "attribute": "sex",
        "records": [
            { "profile": profile_json(), "high_income": true },
            { "profile": profile_json(), "high_income": false },
            { "profile": woman.clone(), "high_income": true },
            { "profile": woman, "high_income": false }
        ]
    });

    let (status, body) = post(app(full_registry()), "/audit_groups", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reference"], "Male");
    assert_eq!(body["comparison"], "Female");
    assert_eq!(body["gap"]["demographic_parity"], 1.0);
}

#[tokio::test]
async fn test_audit_groups_empty_batch() {
    let request = json!({ "attribute": "race", "records": [] });
    let (status, _) = post(app(full_registry()), "/audit_groups", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_numeric_strings_from_form_inputs() {
    let mut profile = profile_json();
    profile["age"] = json!("45");
    profile["hours_per_week"] = json!("50");

    let (status, body) = post(app(full_registry()), "/predict_salary_range", profile).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["median"], 100_000.0);
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let mut profile = profile_json();
    profile.as_object_mut().unwrap().remove("sex");

    let (status, body) = post(app(full_registry()), "/predict", profile).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("sex"));

    let mut profile = profile_json();
    profile["age"] = json!("forty-five");
    let (status, body) = post(app(full_registry()), "/analyze_fairness", profile).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_malformed_audit_request_is_bad_request() {
    let request = json!({ "attribute": "religion", "records": [] });
    let (status, body) = post(app(full_registry()), "/audit_groups", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_non_finite_score_is_server_error() {
    let registry = full_registry()
        .with(
            ModelRole::Regressor,
            Arc::new(FnScorer::new(SchemaKind::Regression, |_| f64::NAN)),
        )
        .unwrap();

    let (status, body) = post(app(registry), "/predict_salary", profile_json()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
    assert_eq!(body["error"], "Model could not score the request");
}
