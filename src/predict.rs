//! Prediction operations
//!
//! Each operation is mapper + scorer(s) → one of the result types below.
//! All-or-nothing: any scorer failure fails the whole prediction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fairness::{
    audit_groups, AuditError, AuditRecord, FairnessEvaluator, FairnessResult, GroupAudit,
    GroupMetricsError, ProtectedAttribute,
};
use crate::features::{FeatureMapper, Mappers};
use crate::model::{ModelRegistry, ModelRole, ScoreError, Scorer};
use crate::profile::UserProfile;

// ============================================================================
// RESULTS
// ============================================================================

pub const LABEL_LOW: &str = "<=50k";
pub const LABEL_HIGH: &str = ">50k";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// "<=50k" or ">50k"
    pub label: String,
    /// Probability of `label`, in [0, 1]
    pub confidence: f64,
}

impl ClassificationResult {
    /// Build from P(>50k). Ties go to "<=50k", as argmax picks the first class.
    pub fn from_probability(p_high: f64) -> Self {
        let p = p_high.clamp(0.0, 1.0);
        if p > 0.5 {
            Self { label: LABEL_HIGH.to_string(), confidence: p }
        } else {
            Self { label: LABEL_LOW.to_string(), confidence: 1.0 - p }
        }
    }

    pub fn is_high(&self) -> bool {
        self.label == LABEL_HIGH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeEstimate {
    pub lower_bound: f64,
    pub median: f64,
    pub upper_bound: f64,
}

impl RangeEstimate {
    /// Floor at zero and clamp the bounds around the median.
    ///
    /// The quantile scorers are fit independently and can cross; the median
    /// is kept and the bounds are pulled to it. Returns whether anything
    /// was clamped.
    pub fn ordered(lower: f64, median: f64, upper: f64) -> (Self, bool) {
        let (lower, median, upper) = (lower.max(0.0), median.max(0.0), upper.max(0.0));
        let estimate = Self {
            lower_bound: lower.min(median),
            median,
            upper_bound: upper.max(median),
        };
        let clamped = estimate.lower_bound != lower || estimate.upper_bound != upper;
        (estimate, clamped)
    }

    pub fn is_ordered(&self) -> bool {
        self.lower_bound <= self.median && self.median <= self.upper_bound
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("no {0} model is loaded")]
    MissingScorer(ModelRole),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Metrics(#[from] GroupMetricsError),
}

impl From<AuditError> for PredictError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Score(e) => PredictError::Score(e),
            AuditError::Metrics(e) => PredictError::Metrics(e),
        }
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

pub fn classify(
    mapper: &FeatureMapper,
    scorer: &dyn Scorer,
    profile: &UserProfile,
) -> Result<ClassificationResult, ScoreError> {
    let p_high = scorer.score(&mapper.map(profile))?;
    Ok(ClassificationResult::from_probability(p_high))
}

pub fn estimate(
    mapper: &FeatureMapper,
    scorer: &dyn Scorer,
    profile: &UserProfile,
) -> Result<PointEstimate, ScoreError> {
    let value = scorer.score(&mapper.map(profile))?;
    Ok(PointEstimate { value: value.max(0.0) })
}

/// The three quantile scorers of a range estimate
pub struct QuantileScorers<'a> {
    pub lower: &'a dyn Scorer,
    pub median: &'a dyn Scorer,
    pub upper: &'a dyn Scorer,
}

pub fn estimate_range(
    mapper: &FeatureMapper,
    scorers: &QuantileScorers<'_>,
    profile: &UserProfile,
) -> Result<RangeEstimate, ScoreError> {
    let features = mapper.map(profile);
    let lower = scorers.lower.score(&features)?;
    let median = scorers.median.score(&features)?;
    let upper = scorers.upper.score(&features)?;

    let (estimate, clamped) = RangeEstimate::ordered(lower, median, upper);
    if clamped {
        tracing::debug!(
            "Quantile outputs crossed ({:.2}, {:.2}, {:.2}), clamped to median",
            lower,
            median,
            upper
        );
    }
    Ok(estimate)
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Registry + mappers, resolving each operation's scorers by role
#[derive(Debug, Clone)]
pub struct Predictor {
    registry: Arc<ModelRegistry>,
    mappers: Arc<Mappers>,
}

impl Predictor {
    pub fn new(registry: Arc<ModelRegistry>, mappers: Arc<Mappers>) -> Self {
        Self { registry, mappers }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub(crate) fn scorer(&self, role: ModelRole) -> Result<&dyn Scorer, PredictError> {
        self.registry
            .get(role)
            .map(|s| s.as_ref())
            .ok_or(PredictError::MissingScorer(role))
    }

    pub fn classify(&self, profile: &UserProfile) -> Result<ClassificationResult, PredictError> {
        let scorer = self.scorer(ModelRole::Classifier)?;
        Ok(classify(&self.mappers.classification, scorer, profile)?)
    }

    pub fn estimate(&self, profile: &UserProfile) -> Result<PointEstimate, PredictError> {
        let scorer = self.scorer(ModelRole::Regressor)?;
        Ok(estimate(&self.mappers.regression, scorer, profile)?)
    }

    pub fn estimate_range(&self, profile: &UserProfile) -> Result<RangeEstimate, PredictError> {
        let scorers = QuantileScorers {
            lower: self.scorer(ModelRole::QuantileLower)?,
            median: self.scorer(ModelRole::QuantileMedian)?,
            upper: self.scorer(ModelRole::QuantileUpper)?,
        };
        Ok(estimate_range(&self.mappers.range, &scorers, profile)?)
    }

    /// Counterfactual audit against the median salary scorer
    pub fn analyze_fairness(&self, profile: &UserProfile) -> Result<FairnessResult, PredictError> {
        let scorer = self.scorer(ModelRole::QuantileMedian)?;
        Ok(FairnessEvaluator::new(&self.mappers.range, scorer).evaluate(profile)?)
    }

    /// Group rates of the classifier over a labelled batch
    pub fn audit_groups(
        &self,
        attribute: ProtectedAttribute,
        records: &[AuditRecord],
    ) -> Result<GroupAudit, PredictError> {
        let scorer = self.scorer(ModelRole::Classifier)?;
        Ok(audit_groups(&self.mappers.classification, scorer, attribute, records)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureValue, FeatureVector, MappingSchema, SchemaKind};
    use crate::model::FnScorer;
    use crate::profile::tests::sample_profile;

    fn int_feature(features: &FeatureVector, name: &str) -> f64 {
        features.get(name).and_then(FeatureValue::as_int).unwrap_or(0) as f64
    }

    #[test]
    fn test_classification_threshold() {
        assert_eq!(ClassificationResult::from_probability(0.8).label, ">50k");
        assert!((ClassificationResult::from_probability(0.8).confidence - 0.8).abs() < 1e-12);

        let low = ClassificationResult::from_probability(0.3);
        assert_eq!(low.label, "<=50k");
        assert!((low.confidence - 0.7).abs() < 1e-12);

        assert_eq!(ClassificationResult::from_probability(0.5).label, "<=50k");
    }

    #[test]
    fn test_classification_probability_is_clamped() {
        let result = ClassificationResult::from_probability(1.7);
        assert_eq!(result.label, ">50k");
        assert_eq!(result.confidence, 1.0);

        let result = ClassificationResult::from_probability(-0.2);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_classify_with_stub() {
        let mapper = FeatureMapper::new(MappingSchema::classification());
        let scorer = FnScorer::new(SchemaKind::Classification, |f: &FeatureVector| {
            if f.get("education-num") == Some(&FeatureValue::Int(21)) { 0.9 } else { 0.1 }
        });
        let result = classify(&mapper, &scorer, &sample_profile()).unwrap();
        assert!(result.is_high());
    }

    #[test]
    fn test_estimate_floors_at_zero() {
        let mapper = FeatureMapper::new(MappingSchema::regression());
        let scorer = FnScorer::new(SchemaKind::Regression, |_| -1200.0);
        assert_eq!(estimate(&mapper, &scorer, &sample_profile()).unwrap().value, 0.0);
    }

    #[test]
    fn test_range_with_monotone_scorers() {
        let mapper = FeatureMapper::new(MappingSchema::range());
        let lower = FnScorer::new(SchemaKind::Range, |f: &FeatureVector| int_feature(f, "AGEP") * 1_000.0);
        let median = FnScorer::new(SchemaKind::Range, |f: &FeatureVector| int_feature(f, "AGEP") * 1_500.0);
        let upper = FnScorer::new(SchemaKind::Range, |f: &FeatureVector| int_feature(f, "AGEP") * 2_000.0);
        let scorers = QuantileScorers { lower: &lower, median: &median, upper: &upper };

        for years in [18, 35, 64, 100] {
            let mut profile = sample_profile();
            profile.age = years;
            let range = estimate_range(&mapper, &scorers, &profile).unwrap();
            assert!(range.is_ordered());
            assert_eq!(range.median, years as f64 * 1_500.0);
        }
    }

    #[test]
    fn test_range_crossing_scorers_are_clamped() {
        let (range, clamped) = RangeEstimate::ordered(60_000.0, 50_000.0, 40_000.0);
        assert!(clamped);
        assert_eq!(range.lower_bound, 50_000.0);
        assert_eq!(range.median, 50_000.0);
        assert_eq!(range.upper_bound, 50_000.0);

        let (range, clamped) = RangeEstimate::ordered(40_000.0, 50_000.0, 70_000.0);
        assert!(!clamped);
        assert_eq!(range, RangeEstimate { lower_bound: 40_000.0, median: 50_000.0, upper_bound: 70_000.0 });
    }

    #[test]
    fn test_range_negative_outputs_floor_at_zero() {
        let (range, _) = RangeEstimate::ordered(-10.0, -5.0, 20.0);
        assert_eq!(range.lower_bound, 0.0);
        assert_eq!(range.median, 0.0);
        assert!(range.is_ordered());
    }

    #[test]
    fn test_predictor_missing_scorer() {
        let predictor = Predictor::new(Arc::new(ModelRegistry::empty()), Arc::new(Mappers::default()));
        let profile = sample_profile();

        assert_eq!(
            predictor.classify(&profile),
            Err(PredictError::MissingScorer(ModelRole::Classifier))
        );
        assert_eq!(
            predictor.estimate(&profile),
            Err(PredictError::MissingScorer(ModelRole::Regressor))
        );
        assert_eq!(
            predictor.estimate_range(&profile),
            Err(PredictError::MissingScorer(ModelRole::QuantileLower))
        );
        assert_eq!(
            predictor.analyze_fairness(&profile),
            Err(PredictError::MissingScorer(ModelRole::QuantileMedian))
        );
    }

    #[test]
    fn test_predictor_uses_registered_scorers() {
        let registry = ModelRegistry::empty()
            .with(ModelRole::Regressor, Arc::new(FnScorer::new(SchemaKind::Regression, |_| 55_000.0)))
            .unwrap();
        let predictor = Predictor::new(Arc::new(registry), Arc::new(Mappers::default()));

        assert_eq!(predictor.estimate(&sample_profile()), Ok(PointEstimate { value: 55_000.0 }));
    }
}
