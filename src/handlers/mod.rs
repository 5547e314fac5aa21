//! HTTP handlers

use axum::extract::FromRequest;

use crate::AppError;

pub mod health;
pub mod models;
pub mod predict;
pub mod fairness;

/// JSON body whose rejections use the `AppError` response format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[cfg(test)]
mod tests;
