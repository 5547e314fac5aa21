//! Feature Mapper - profile → schema-specific feature vector
//!
//! Pure and total: every profile maps, unknown categories take their
//! table's default code.

use crate::profile::{UserProfile, DEFAULT_CAPITAL, DEFAULT_FNLWGT};

use super::layout::SchemaKind;
use super::tables::LookupTables;
use super::vector::{FeatureValue, FeatureVector};

// ============================================================================
// MAPPING SCHEMA
// ============================================================================

/// A target schema together with the tables used to encode it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSchema {
    pub kind: SchemaKind,
    pub tables: LookupTables,
}

impl MappingSchema {
    pub fn new(kind: SchemaKind, tables: LookupTables) -> Self {
        Self { kind, tables }
    }

    pub fn classification() -> Self {
        Self::new(SchemaKind::Classification, LookupTables::acs())
    }

    pub fn regression() -> Self {
        Self::new(SchemaKind::Regression, LookupTables::acs())
    }

    pub fn range() -> Self {
        Self::new(SchemaKind::Range, LookupTables::acs_extended())
    }

    /// Default tables for `kind`
    pub fn for_kind(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::Classification => Self::classification(),
            SchemaKind::Regression => Self::regression(),
            SchemaKind::Range => Self::range(),
        }
    }
}

// ============================================================================
// FEATURE MAPPER
// ============================================================================

#[derive(Debug, Clone)]
pub struct FeatureMapper {
    schema: MappingSchema,
}

impl FeatureMapper {
    pub fn new(schema: MappingSchema) -> Self {
        Self { schema }
    }

    pub fn kind(&self) -> SchemaKind {
        self.schema.kind
    }

    /// Encode `profile` in this mapper's schema
    pub fn map(&self, profile: &UserProfile) -> FeatureVector {
        let kind = self.schema.kind;
        let values = match kind {
            SchemaKind::Classification => self.classification_values(profile),
            SchemaKind::Regression => self.regression_values(profile),
            SchemaKind::Range => self.range_values(profile),
        };

        // Text coding is declared per schema
        let values = kind
            .layout()
            .iter()
            .zip(values)
            .map(|(name, value)| match value {
                FeatureValue::Int(code) if kind.is_text(name) => FeatureValue::Text(code.to_string()),
                other => other,
            })
            .collect();

        FeatureVector::from_values(kind, values)
    }

    // ------------------------------------------------------------------------
    // Per-schema encodings, in layout order
    // ------------------------------------------------------------------------

    fn classification_values(&self, p: &UserProfile) -> Vec<FeatureValue> {
        let t = &self.schema.tables;
        vec![
            FeatureValue::Int(i64::from(p.age)),
            p.work_class.as_str().into(),
            FeatureValue::Int(p.fnlwgt.unwrap_or(DEFAULT_FNLWGT)),
            p.education_level.as_str().into(),
            FeatureValue::Int(t.education.code(&p.education_level)),
            p.marital_status.as_str().into(),
            p.major.as_str().into(),
            p.relationship_or_default().into(),
            p.race.as_str().into(),
            p.sex.as_str().into(),
            FeatureValue::Int(p.capital_gain.unwrap_or(DEFAULT_CAPITAL)),
            FeatureValue::Int(p.capital_loss.unwrap_or(DEFAULT_CAPITAL)),
            FeatureValue::Int(i64::from(p.hours_per_week_or_default())),
            p.native_country_or_default().into(),
        ]
    }

    fn regression_values(&self, p: &UserProfile) -> Vec<FeatureValue> {
        let t = &self.schema.tables;
        vec![
            FeatureValue::Int(i64::from(p.age)),
            FeatureValue::Int(t.education.code(&p.education_level)),
            FeatureValue::Int(t.marital.code(&p.marital_status)),
            FeatureValue::Int(t.race.code(&p.race)),
            FeatureValue::Int(t.sex.code(&p.sex)),
            FeatureValue::Int(t.nativity.code(p.native_country_or_default())),
            FeatureValue::Int(t.occupation.code(&p.major)),
        ]
    }

    fn range_values(&self, p: &UserProfile) -> Vec<FeatureValue> {
        let t = &self.schema.tables;
        vec![
            FeatureValue::Int(i64::from(p.age)),
            FeatureValue::Int(t.education.code(&p.education_level)),
            FeatureValue::Int(t.marital.code(&p.marital_status)),
            FeatureValue::Int(t.sex.code(&p.sex)),
            FeatureValue::Int(t.race.code(&p.race)),
            FeatureValue::Int(t.occupation.code(&p.major)),
            FeatureValue::Int(i64::from(p.hours_per_week_or_default())),
            FeatureValue::Int(t.work_class.code(&p.work_class)),
        ]
    }
}

impl Default for FeatureMapper {
    fn default() -> Self {
        Self::new(MappingSchema::classification())
    }
}

/// One mapper per schema, shared by the request handlers
#[derive(Debug, Clone)]
pub struct Mappers {
    pub classification: FeatureMapper,
    pub regression: FeatureMapper,
    pub range: FeatureMapper,
}

impl Default for Mappers {
    fn default() -> Self {
        Self {
            classification: FeatureMapper::new(MappingSchema::classification()),
            regression: FeatureMapper::new(MappingSchema::regression()),
            range: FeatureMapper::new(MappingSchema::range()),
        }
    }
}
