//! Scorer - narrow interface over a trained model
//!
//! The core only ever sees `score(&FeatureVector) -> f64`. What sits behind
//! it (a linear artifact, a stub in tests) is opaque.

use thiserror::Error;

use crate::features::{FeatureVector, LayoutMismatchError, SchemaKind};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// Vector was built for another schema than the scorer was fit on
    #[error(transparent)]
    SchemaMismatch(#[from] LayoutMismatchError),

    #[error("scorer produced a non-finite value: {0}")]
    NonFinite(f64),
}

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// A trained scoring function bound to one schema
pub trait Scorer: Send + Sync {
    /// Schema the scorer expects its input in
    fn schema(&self) -> SchemaKind;

    /// Score a vector. Fails only when the vector does not match `schema()`.
    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError>;

    /// Human-readable name for status and logs
    fn name(&self) -> &str {
        "scorer"
    }
}

/// Check schema, run `f`, reject NaN/inf
pub(crate) fn checked_score(
    schema: SchemaKind,
    features: &FeatureVector,
    f: impl FnOnce(&FeatureVector) -> f64,
) -> Result<f64, ScoreError> {
    features.validate_for(schema)?;

    let value = f(features);
    if !value.is_finite() {
        return Err(ScoreError::NonFinite(value));
    }
    Ok(value)
}

// ============================================================================
// CLOSURE SCORER
// ============================================================================

/// Scorer backed by a plain function, for stubs and synthetic models
pub struct FnScorer<F> {
    schema: SchemaKind,
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&FeatureVector) -> f64 + Send + Sync,
{
    pub fn new(schema: SchemaKind, f: F) -> Self {
        Self { schema, f }
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&FeatureVector) -> f64 + Send + Sync,
{
    fn schema(&self) -> SchemaKind {
        self.schema
    }

    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError> {
        checked_score(self.schema, features, &self.f)
    }

    fn name(&self) -> &str {
        "fn"
    }
}

// ============================================================================
// TESTS
// ============================================================================
