//! Model Registry - scorers loaded once at startup
//!
//! Each role has a fixed artifact file under the models directory. A
//! missing file leaves the role empty; a corrupt one fails startup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::linear::{LinearScorer, ModelLoadError};
use super::scorer::Scorer;
use crate::features::{SchemaKind, LAYOUT_VERSION};

// ============================================================================
// ROLES
// ============================================================================

/// What a loaded scorer is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    Classifier,
    Regressor,
    QuantileLower,
    QuantileMedian,
    QuantileUpper,
}

impl ModelRole {
    pub const ALL: [ModelRole; 5] = [
        ModelRole::Classifier,
        ModelRole::Regressor,
        ModelRole::QuantileLower,
        ModelRole::QuantileMedian,
        ModelRole::QuantileUpper,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ModelRole::Classifier => "uci_classifier.json",
            ModelRole::Regressor => "acs_regressor.json",
            ModelRole::QuantileLower => "acs_quantile_lower.json",
            ModelRole::QuantileMedian => "acs_quantile_median.json",
            ModelRole::QuantileUpper => "acs_quantile_upper.json",
        }
    }

    /// Schema a scorer in this role must be fit on
    pub fn schema(&self) -> SchemaKind {
        match self {
            ModelRole::Classifier => SchemaKind::Classification,
            ModelRole::Regressor => SchemaKind::Regression,
            ModelRole::QuantileLower | ModelRole::QuantileMedian | ModelRole::QuantileUpper => {
                SchemaKind::Range
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelRole::Classifier => "classifier",
            ModelRole::Regressor => "regressor",
            ModelRole::QuantileLower => "quantile_lower",
            ModelRole::QuantileMedian => "quantile_median",
            ModelRole::QuantileUpper => "quantile_upper",
        }
    }
}

impl std::fmt::Display for ModelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub role: ModelRole,
    pub loaded: bool,
    pub model_name: Option<String>,
    pub schema: SchemaKind,
    pub layout_version: u8,
    pub layout_hash: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub models: Vec<ModelStatus>,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Read-only set of scorers, shared across requests
#[derive(Clone)]
pub struct ModelRegistry {
    scorers: BTreeMap<ModelRole, Arc<dyn Scorer>>,
    loaded_at: DateTime<Utc>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self {
            scorers: BTreeMap::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Register a scorer for `role`, checking its schema
    pub fn with(mut self, role: ModelRole, scorer: Arc<dyn Scorer>) -> Result<Self, ModelLoadError> {
        if scorer.schema() != role.schema() {
            return Err(ModelLoadError::WrongSchema {
                model: scorer.name().to_string(),
                expected: role.schema(),
                actual: scorer.schema(),
            });
        }
        self.scorers.insert(role, scorer);
        Ok(self)
    }

    /// Load every role's artifact found in `dir`
    pub fn load_dir(dir: &Path) -> Result<Self, ModelLoadError> {
        tracing::info!("Loading models from: {}", dir.display());

        let mut registry = Self::empty();
        for role in ModelRole::ALL {
            let path = dir.join(role.file_name());
            if !path.exists() {
                tracing::warn!("No {} model at {}, endpoints using it will be unavailable", role, path.display());
                continue;
            }

            let scorer = LinearScorer::load(&path)?;
            tracing::info!("Loaded {} model '{}' ({} schema)", role, scorer.name, scorer.schema);
            registry = registry.with(role, Arc::new(scorer))?;
        }

        Ok(registry)
    }

    pub fn get(&self, role: ModelRole) -> Option<&Arc<dyn Scorer>> {
        self.scorers.get(&role)
    }

    pub fn is_loaded(&self, role: ModelRole) -> bool {
        self.scorers.contains_key(&role)
    }

    pub fn status(&self) -> RegistryStatus {
        let models = ModelRole::ALL
            .iter()
            .map(|&role| {
                let scorer = self.get(role);
                ModelStatus {
                    role,
                    loaded: scorer.is_some(),
                    model_name: scorer.map(|s| s.name().to_string()),
                    schema: role.schema(),
                    layout_version: LAYOUT_VERSION,
                    layout_hash: role.schema().layout_hash(),
                }
            })
            .collect();

        RegistryStatus {
            models,
            loaded_at: self.loaded_at,
        }
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("roles", &self.scorers.keys().collect::<Vec<_>>())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
