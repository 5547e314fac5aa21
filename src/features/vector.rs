//! Feature Vector - model-ready encoding of a profile
//!
//! Values are stored in the order of their schema's layout. A vector is
//! never mutated after the mapper builds it.

use serde::{Deserialize, Serialize};

use super::layout::{validate_layout, LayoutMismatchError, SchemaKind};

// ============================================================================
// FEATURE VALUE
// ============================================================================

/// A single feature: numeric code or categorical text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Text(String),
}

impl FeatureValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    /// Category key used for one-hot style lookups
    pub fn category_key(&self) -> String {
        match self {
            FeatureValue::Int(v) => v.to_string(),
            FeatureValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Int(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Ordered feature vector tagged with its schema and layout hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    schema: SchemaKind,
    layout_hash: u32,
    values: Vec<FeatureValue>,
}

impl FeatureVector {
    /// `values` must follow `schema.layout()` order.
    pub(crate) fn from_values(schema: SchemaKind, values: Vec<FeatureValue>) -> Self {
        debug_assert_eq!(values.len(), schema.feature_count());
        Self {
            schema,
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    pub fn schema(&self) -> SchemaKind {
        self.schema
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    /// Feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        self.schema.layout()
    }

    /// Get feature by name
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.schema.feature_index(name).and_then(|i| self.values.get(i))
    }

    /// (name, value) pairs in layout order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> + '_ {
        self.schema.layout().iter().copied().zip(self.values.iter())
    }

    /// Validate that this vector matches the schema a scorer expects
    pub fn validate_for(&self, expected: SchemaKind) -> Result<(), LayoutMismatchError> {
        validate_layout(expected, self.schema, self.layout_hash)
    }

    /// JSON object keyed by feature name, for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let named: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(name, value)| {
                let json = match value {
                    FeatureValue::Int(v) => serde_json::Value::from(*v),
                    FeatureValue::Text(s) => serde_json::Value::from(s.as_str()),
                };
                (name.to_string(), json)
            })
            .collect();

        serde_json::json!({
            "schema": self.schema,
            "layout_hash": self.layout_hash,
            "features": named,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn regression_vector() -> FeatureVector {
        FeatureVector::from_values(
            SchemaKind::Regression,
            [35, 21, 1, 1, 1, 1, 1021].into_iter().map(FeatureValue::Int).collect(),
        )
    }

    #[test]
    fn test_get_by_name() {
        let vector = regression_vector();
        assert_eq!(vector.get("AGEP"), Some(&FeatureValue::Int(35)));
        assert_eq!(vector.get("OCCP").and_then(|v| v.as_int()), Some(1021));
        assert_eq!(vector.get("nonexistent"), None);
    }

    #[test]
    fn test_iter_follows_layout() {
        let vector = regression_vector();
        let names: Vec<&str> = vector.iter().map(|(n, _)| n).collect();
        assert_eq!(names, SchemaKind::Regression.layout());
    }

    #[test]
    fn test_validate_for() {
        let vector = regression_vector();
        assert!(vector.validate_for(SchemaKind::Regression).is_ok());
        assert!(vector.validate_for(SchemaKind::Range).is_err());
    }

    #[test]
    fn test_category_key() {
        assert_eq!(FeatureValue::Int(1021).category_key(), "1021");
        assert_eq!(FeatureValue::from("Male").category_key(), "Male");
    }

    #[test]
    fn test_to_log_entry() {
        let log = regression_vector().to_log_entry();
        assert_eq!(log["schema"], "regression");
        assert_eq!(log["features"]["SCHL"], 21);
        assert!(log["layout_hash"].as_u64().is_some());
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_value(vec![FeatureValue::Int(3), FeatureValue::from("1")]).unwrap();
        assert_eq!(json, serde_json::json!([3, "1"]));
    }
}
