//! Feature Layout - per-schema feature definitions
//!
//! **Each schema's layout must match the order its scorer was fit on.**
//!
//! ## Rules:
//! 1. Add, remove or reorder a feature → increment LAYOUT_VERSION
//! 2. Change which features are text-coded → increment LAYOUT_VERSION
//!
//! Scorers check the layout hash of every vector they receive, so a stale
//! artifact fails loudly instead of scoring garbage.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Current feature layout version, shared by all schemas
pub const LAYOUT_VERSION: u8 = 1;

// ============================================================================
// SCHEMA LAYOUTS (Authoritative source)
// ============================================================================

/// UCI Adult classifier, in the dataset's column order
pub const CLASSIFICATION_LAYOUT: &[&str] = &[
    "age",            // 0
    "workclass",      // 1
    "fnlwgt",         // 2
    "education",      // 3
    "education-num",  // 4: ACS SCHL code of the education level
    "marital-status", // 5
    "occupation",     // 6: major as sent by the caller
    "relationship",   // 7
    "race",           // 8
    "sex",            // 9
    "capital-gain",   // 10
    "capital-loss",   // 11
    "hours-per-week", // 12
    "native-country", // 13
];

/// Raw string features of the classifier (one-hot encoded by the model)
const CLASSIFICATION_TEXT: &[&str] = &[
    "workclass",
    "education",
    "marital-status",
    "occupation",
    "relationship",
    "race",
    "sex",
    "native-country",
];

/// ACS point regressor
pub const REGRESSION_LAYOUT: &[&str] = &[
    "AGEP",     // 0: age
    "SCHL",     // 1: educational attainment
    "MAR",      // 2: marital status
    "RAC1P",    // 3: race
    "SEX",      // 4
    "NATIVITY", // 5
    "OCCP",     // 6: occupation
];

/// ACS quantile regressors
pub const RANGE_LAYOUT: &[&str] = &[
    "AGEP",  // 0
    "SCHL",  // 1
    "MAR",   // 2
    "SEX",   // 3: stringified code
    "RAC1P", // 4: stringified code
    "OCCP",  // 5: stringified code
    "WKHP",  // 6: hours per week
    "COW",   // 7: class of worker
];

/// The quantile models were fit with these codes as categorical strings
const RANGE_TEXT: &[&str] = &["SEX", "RAC1P", "OCCP"];

// ============================================================================
// SCHEMA KIND
// ============================================================================

/// Named target schema of a scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Classification,
    Regression,
    Range,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [
        SchemaKind::Classification,
        SchemaKind::Regression,
        SchemaKind::Range,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Classification => "classification",
            SchemaKind::Regression => "regression",
            SchemaKind::Range => "range",
        }
    }

    /// Feature names in exact vector order
    pub fn layout(&self) -> &'static [&'static str] {
        match self {
            SchemaKind::Classification => CLASSIFICATION_LAYOUT,
            SchemaKind::Regression => REGRESSION_LAYOUT,
            SchemaKind::Range => RANGE_LAYOUT,
        }
    }

    /// Features carried as text in this schema
    pub fn text_features(&self) -> &'static [&'static str] {
        match self {
            SchemaKind::Classification => CLASSIFICATION_TEXT,
            SchemaKind::Regression => &[],
            SchemaKind::Range => RANGE_TEXT,
        }
    }

    pub fn is_text(&self, feature: &str) -> bool {
        self.text_features().contains(&feature)
    }

    pub fn feature_count(&self) -> usize {
        self.layout().len()
    }

    /// Get feature index by name
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.layout().iter().position(|&n| n == name)
    }

    /// CRC32 over version, schema name and ordered feature names
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[LAYOUT_VERSION]);
        hasher.update(self.as_str().as_bytes());
        hasher.update(&[0]);

        for name in self.layout() {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }
        for name in self.text_features() {
            hasher.update(name.as_bytes());
            hasher.update(&[1]);
        }

        hasher.finalize()
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub schema: SchemaKind,
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn of(schema: SchemaKind) -> Self {
        Self {
            schema,
            version: LAYOUT_VERSION,
            hash: schema.layout_hash(),
            feature_count: schema.feature_count(),
            feature_names: schema.layout().iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Feature vector does not match the schema a scorer expects
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature layout mismatch: expected {expected} (hash: {expected_hash:08x}), got {actual} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected: SchemaKind,
    pub expected_hash: u32,
    pub actual: SchemaKind,
    pub actual_hash: u32,
}

/// Validate that an incoming vector's schema and hash match `expected`
pub fn validate_layout(
    expected: SchemaKind,
    actual: SchemaKind,
    actual_hash: u32,
) -> Result<(), LayoutMismatchError> {
    let expected_hash = expected.layout_hash();

    if expected != actual || expected_hash != actual_hash {
        return Err(LayoutMismatchError {
            expected,
            expected_hash,
            actual,
            actual_hash,
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
