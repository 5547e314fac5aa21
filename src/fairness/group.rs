//! Group fairness metrics
//!
//! Demographic parity, TPR and FPR per protected group over a labelled
//! batch, and the gap between a reference group and a comparison group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureMapper;
use crate::model::{ScoreError, Scorer};
use crate::predict::ClassificationResult;
use crate::profile::UserProfile;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupMetricsError {
    #[error("length mismatch: {groups} groups, {labels} labels, {predictions} predictions")]
    LengthMismatch {
        groups: usize,
        labels: usize,
        predictions: usize,
    },

    #[error("no records to audit")]
    Empty,
}

// ============================================================================
// RATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupRates {
    pub count: usize,
    /// Share of positive predictions
    pub demographic_parity: f64,
    /// TP / (TP + FN); `None` without positive labels
    pub tpr: Option<f64>,
    /// FP / (FP + TN); `None` without negative labels
    pub fpr: Option<f64>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Confusion {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl Confusion {
    fn add(&mut self, truth: bool, predicted: bool) {
        match (truth, predicted) {
            (true, true) => self.tp += 1,
            (false, true) => self.fp += 1,
            (false, false) => self.tn += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    fn rates(&self) -> GroupRates {
        let ratio = |num: usize, den: usize| (den > 0).then(|| num as f64 / den as f64);
        GroupRates {
            count: self.total(),
            demographic_parity: ratio(self.tp + self.fp, self.total()).unwrap_or(0.0),
            tpr: ratio(self.tp, self.tp + self.fn_),
            fpr: ratio(self.fp, self.fp + self.tn),
        }
    }
}

/// Per-group rates, keyed by group name
pub fn group_rates<S: AsRef<str>>(
    groups: &[S],
    y_true: &[bool],
    y_pred: &[bool],
) -> Result<BTreeMap<String, GroupRates>, GroupMetricsError> {
    if groups.len() != y_true.len() || y_true.len() != y_pred.len() {
        return Err(GroupMetricsError::LengthMismatch {
            groups: groups.len(),
            labels: y_true.len(),
            predictions: y_pred.len(),
        });
    }
    if groups.is_empty() {
        return Err(GroupMetricsError::Empty);
    }

    let mut confusion: BTreeMap<String, Confusion> = BTreeMap::new();
    for ((group, &truth), &predicted) in groups.iter().zip(y_true).zip(y_pred) {
        confusion
            .entry(group.as_ref().to_string())
            .or_default()
            .add(truth, predicted);
    }

    Ok(confusion
        .into_iter()
        .map(|(group, c)| (group, c.rates()))
        .collect())
}

// ============================================================================
// GAPS
// ============================================================================

/// `reference - comparison` for each rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateGap {
    pub demographic_parity: Option<f64>,
    pub tpr: Option<f64>,
    pub fpr: Option<f64>,
}

/// Gap between two groups; `None` where either side is missing or undefined
pub fn rate_gap(rates: &BTreeMap<String, GroupRates>, reference: &str, comparison: &str) -> RateGap {
    let a = rates.get(reference);
    let b = rates.get(comparison);
    let diff = |f: fn(&GroupRates) -> Option<f64>| match (a.and_then(f), b.and_then(f)) {
        (Some(x), Some(y)) => Some(x - y),
        _ => None,
    };

    RateGap {
        demographic_parity: diff(|r| Some(r.demographic_parity)),
        tpr: diff(|r| r.tpr),
        fpr: diff(|r| r.fpr),
    }
}

// ============================================================================
// BATCH AUDIT
// ============================================================================

/// Protected attribute the batch is split on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedAttribute {
    Sex,
    /// White vs everyone else
    Race,
}

impl ProtectedAttribute {
    pub fn group_of(&self, profile: &UserProfile) -> String {
        match self {
            ProtectedAttribute::Sex => profile.sex.clone(),
            ProtectedAttribute::Race if profile.race == "White" => "White".to_string(),
            ProtectedAttribute::Race => "Non-White".to_string(),
        }
    }

    /// (reference, comparison) groups of the reported gap
    pub fn gap_groups(&self) -> (&'static str, &'static str) {
        match self {
            ProtectedAttribute::Sex => ("Male", "Female"),
            ProtectedAttribute::Race => ("White", "Non-White"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub profile: UserProfile,
    /// Ground truth: income above 50k
    pub high_income: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAudit {
    pub attribute: ProtectedAttribute,
    pub groups: BTreeMap<String, GroupRates>,
    pub reference: String,
    pub comparison: String,
    pub gap: RateGap,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuditError {
    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Metrics(#[from] GroupMetricsError),
}

/// Classify every record and compute group rates on `attribute`
pub fn audit_groups(
    mapper: &FeatureMapper,
    classifier: &dyn Scorer,
    attribute: ProtectedAttribute,
    records: &[AuditRecord],
) -> Result<GroupAudit, AuditError> {
    let mut groups = Vec::with_capacity(records.len());
    let mut y_true = Vec::with_capacity(records.len());
    let mut y_pred = Vec::with_capacity(records.len());

    for record in records {
        let p_high = classifier.score(&mapper.map(&record.profile))?;
        groups.push(attribute.group_of(&record.profile));
        y_true.push(record.high_income);
        y_pred.push(ClassificationResult::from_probability(p_high).is_high());
    }

    let rates = group_rates(groups.as_slice(), &y_true, &y_pred)?;
    let (reference, comparison) = attribute.gap_groups();
    let gap = rate_gap(&rates, reference, comparison);

    tracing::info!(
        "Group audit on {:?}: {} records, {} groups, DP gap {:?}",
        attribute,
        records.len(),
        rates.len(),
        gap.demographic_parity
    );

    Ok(GroupAudit {
        attribute,
        groups: rates,
        reference: reference.to_string(),
        comparison: comparison.to_string(),
        gap,
    })
}

// ============================================================================
// TESTS
// ============================================================================
