//! Counterfactual fairness - single-attribute perturbation
//!
//! Scores a profile, the same profile with `sex` flipped and with `race`
//! swapped, then reports the relative gap of each counterfactual.

use serde::{Deserialize, Serialize};

use crate::features::FeatureMapper;
use crate::model::{ScoreError, Scorer};
use crate::profile::UserProfile;

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessResult {
    pub original: f64,
    pub gender_counterfactual: f64,
    pub race_counterfactual: f64,
    /// `None` when the baseline is zero
    pub gender_gap_percent: Option<f64>,
    /// `None` when the baseline is zero
    pub race_gap_percent: Option<f64>,
}

// ============================================================================
// GAP
// ============================================================================

/// Signed `(counterfactual - original) / original * 100`, rounded to 2
/// decimals. `None` for a zero baseline or when the ratio is not finite.
pub fn gap_percent(original: f64, counterfactual: f64) -> Option<f64> {
    if original == 0.0 {
        return None;
    }

    let gap = round2((counterfactual - original) / original * 100.0);
    if !gap.is_finite() {
        tracing::debug!(
            "Gap of {} against baseline {} is not finite, left undefined",
            counterfactual,
            original
        );
        return None;
    }
    Some(gap)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// EVALUATOR
// ============================================================================

pub struct FairnessEvaluator<'a> {
    mapper: &'a FeatureMapper,
    scorer: &'a dyn Scorer,
}

impl<'a> FairnessEvaluator<'a> {
    pub fn new(mapper: &'a FeatureMapper, scorer: &'a dyn Scorer) -> Self {
        Self { mapper, scorer }
    }

    fn score(&self, profile: &UserProfile) -> Result<f64, ScoreError> {
        self.scorer.score(&self.mapper.map(profile))
    }

    /// Baseline plus sex and race counterfactuals. The input is not touched.
    pub fn evaluate(&self, profile: &UserProfile) -> Result<FairnessResult, ScoreError> {
        let original = self.score(profile)?;
        let gender_counterfactual = self.score(&profile.with_sex_flipped())?;
        let race_counterfactual = self.score(&profile.with_race_swapped())?;

        let result = FairnessResult {
            original,
            gender_counterfactual,
            race_counterfactual,
            gender_gap_percent: gap_percent(original, gender_counterfactual),
            race_gap_percent: gap_percent(original, race_counterfactual),
        };

        if original == 0.0 {
            tracing::debug!("Zero baseline prediction, gap percentages left undefined");
        }
        tracing::debug!(
            "Fairness audit: original={:.2} gender_gap={:?} race_gap={:?}",
            result.original,
            result.gender_gap_percent,
            result.race_gap_percent
        );

        Ok(result)
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

    /// Pays women 10% less and non-white workers 5% less
    fn biased_scorer() -> FnScorer<impl Fn(&FeatureVector) -> f64 + Send + Sync> {
        FnScorer::new(SchemaKind::Range, |f: &FeatureVector| {
            let mut salary = 100_000.0;
            if f.get("SEX") == Some(&FeatureValue::from("2")) {
                salary *= 0.9;
            }
            if f.get("RAC1P") != Some(&FeatureValue::from("1")) {
                salary *= 0.95;
            }
            salary
        })
    }

    #[test]
    fn test_gap_percent() {
        assert_eq!(gap_percent(70_000.0, 77_000.0), Some(10.0));
        assert_eq!(gap_percent(50_000.0, 45_000.0), Some(-10.0));
        assert_eq!(gap_percent(30_000.0, 30_000.0), Some(0.0));
    }

    #[test]
    fn test_gap_percent_rounds_to_two_decimals() {
        assert_eq!(gap_percent(3.0, 4.0), Some(33.33));
        assert_eq!(gap_percent(3.0, 2.0), Some(-33.33));
    }

    #[test]
    fn test_gap_percent_zero_baseline() {
        assert_eq!(gap_percent(0.0, 50_000.0), None);
        assert_eq!(gap_percent(0.0, 0.0), None);
    }

    #[test]
    fn test_gap_percent_overflow_is_undefined() {
        assert_eq!(gap_percent(1e-308, 1e10), None);
        assert_eq!(gap_percent(f64::MIN_POSITIVE, -1e300), None);
        assert_eq!(gap_percent(1.0, f64::INFINITY), None);
    }

    #[test]
    fn test_evaluate_biased_scorer() {
        let mapper = FeatureMapper::new(MappingSchema::range());
        let scorer = biased_scorer();
        let result = FairnessEvaluator::new(&mapper, &scorer)
            .evaluate(&sample_profile())
            .unwrap();

        assert_eq!(result.original, 100_000.0);
        assert_eq!(result.gender_counterfactual, 90_000.0);
        assert_eq!(result.race_counterfactual, 95_000.0);
        assert_eq!(result.gender_gap_percent, Some(-10.0));
        assert_eq!(result.race_gap_percent, Some(-5.0));
    }

    #[test]
    fn test_evaluate_from_disadvantaged_baseline() {
        let mapper = FeatureMapper::new(MappingSchema::range());
        let scorer = biased_scorer();
        let mut profile = sample_profile();
        profile.sex = "Female".to_string();
        profile.race = "Black".to_string();

        let result = FairnessEvaluator::new(&mapper, &scorer).evaluate(&profile).unwrap();
        assert_eq!(result.gender_gap_percent, Some(11.11));
        assert_eq!(result.race_gap_percent, Some(5.26));
    }

    #[test]
    fn test_evaluate_does_not_mutate_profile() {
        let mapper = FeatureMapper::new(MappingSchema::range());
        let scorer = biased_scorer();
        let profile = sample_profile();
        let before = profile.clone();

        FairnessEvaluator::new(&mapper, &scorer).evaluate(&profile).unwrap();
        assert_eq!(profile, before);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let mapper = FeatureMapper::new(MappingSchema::range());
        let scorer = biased_scorer();
        let evaluator = FairnessEvaluator::new(&mapper, &scorer);
        let profile = sample_profile();

        assert_eq!(evaluator.evaluate(&profile).unwrap(), evaluator.evaluate(&profile).unwrap());
    }

    #[test]
    fn test_evaluate_zero_baseline() {
        let mapper = FeatureMapper::new(MappingSchema::range());
        let scorer = FnScorer::new(SchemaKind::Range, |f: &FeatureVector| {
            if f.get("SEX") == Some(&FeatureValue::from("1")) { 0.0 } else { 40_000.0 }
        });

        let result = FairnessEvaluator::new(&mapper, &scorer).evaluate(&sample_profile()).unwrap();
        assert_eq!(result.original, 0.0);
        assert_eq!(result.gender_counterfactual, 40_000.0);
        assert_eq!(result.gender_gap_percent, None);
        assert_eq!(result.race_gap_percent, None);

        let json = serde_json::to_value(result).unwrap();
        assert!(json["gender_gap_percent"].is_null());
    }

    #[test]
    fn test_evaluate_schema_mismatch_fails_whole_result() {
        let mapper = FeatureMapper::new(MappingSchema::regression());
        let scorer = biased_scorer();
        let result = FairnessEvaluator::new(&mapper, &scorer).evaluate(&sample_profile());
        assert!(matches!(result, Err(ScoreError::SchemaMismatch(_))));
    }
}
