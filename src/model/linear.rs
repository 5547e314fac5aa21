//! Linear scorer artifact
//!
//! A model file is a JSON document:
//!
//! ```json
//! {
//!   "name": "acs_regressor",
//!   "schema": "regression",
//!   "link": "identity",
//!   "intercept": 12000.0,
//!   "numeric": { "AGEP": 850.0, "SCHL": 2100.0 },
//!   "categorical": { "OCCP": { "1021": 30000.0 } }
//! }
//! ```
//!
//! The output is `intercept + Σ numeric[f] × value(f) + Σ categorical[f][value(f)]`,
//! passed through the link. Numeric weights apply to integer features only;
//! a category missing from its map contributes 0.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::scorer::{checked_score, ScoreError, Scorer};
use crate::features::{FeatureValue, FeatureVector, SchemaKind};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model {model} references feature {feature} not in the {schema} schema")]
    UnknownFeature {
        model: String,
        feature: String,
        schema: SchemaKind,
    },

    #[error("model {model} has a non-finite weight for {feature}")]
    NonFiniteWeight { model: String, feature: String },

    #[error("model {model} is fit on the {actual} schema, expected {expected}")]
    WrongSchema {
        model: String,
        expected: SchemaKind,
        actual: SchemaKind,
    },
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// Output link function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    #[default]
    Identity,
    /// Sigmoid, for probability outputs
    Logistic,
}

impl Link {
    fn apply(&self, margin: f64) -> f64 {
        match self {
            Link::Identity => margin,
            Link::Logistic => 1.0 / (1.0 + (-margin).exp()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScorer {
    pub name: String,
    pub schema: SchemaKind,
    #[serde(default)]
    pub link: Link,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
}

impl LinearScorer {
    pub fn new(name: &str, schema: SchemaKind) -> Self {
        Self {
            name: name.to_string(),
            schema,
            link: Link::Identity,
            intercept: 0.0,
            numeric: HashMap::new(),
            categorical: HashMap::new(),
        }
    }

    /// Load and validate an artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: display.clone(),
            source,
        })?;
        let scorer: LinearScorer = serde_json::from_str(&raw).map_err(|source| ModelLoadError::Parse {
            path: display,
            source,
        })?;

        scorer.validate()?;
        Ok(scorer)
    }

    /// Every weighted feature must exist in the schema and be finite
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        for (feature, weight) in &self.numeric {
            self.check_feature(feature)?;
            self.check_weight(feature, *weight)?;
        }
        for (feature, categories) in &self.categorical {
            self.check_feature(feature)?;
            for weight in categories.values() {
                self.check_weight(feature, *weight)?;
            }
        }
        self.check_weight("intercept", self.intercept)
    }

    fn check_feature(&self, feature: &str) -> Result<(), ModelLoadError> {
        if self.schema.feature_index(feature).is_none() {
            return Err(ModelLoadError::UnknownFeature {
                model: self.name.clone(),
                feature: feature.to_string(),
                schema: self.schema,
            });
        }
        Ok(())
    }

    fn check_weight(&self, feature: &str, weight: f64) -> Result<(), ModelLoadError> {
        if !weight.is_finite() {
            return Err(ModelLoadError::NonFiniteWeight {
                model: self.name.clone(),
                feature: feature.to_string(),
            });
        }
        Ok(())
    }

    fn margin(&self, features: &FeatureVector) -> f64 {
        features.iter().fold(self.intercept, |acc, (name, value)| {
            let numeric = match (value, self.numeric.get(name)) {
                (FeatureValue::Int(v), Some(w)) => *v as f64 * w,
                _ => 0.0,
            };
            let categorical = self
                .categorical
                .get(name)
                .and_then(|cats| cats.get(&value.category_key()))
                .copied()
                .unwrap_or(0.0);
            acc + numeric + categorical
        })
    }
}

impl Scorer for LinearScorer {
    fn schema(&self) -> SchemaKind {
        self.schema
    }

    fn score(&self, features: &FeatureVector) -> Result<f64, ScoreError> {
        checked_score(self.schema, features, |f| self.link.apply(self.margin(f)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// TESTS
// ============================================================================
