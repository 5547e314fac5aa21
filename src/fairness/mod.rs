//! Fairness Module - counterfactual and group diagnostics

pub mod counterfactual;
pub mod group;

// Re-export common types
pub use counterfactual::{gap_percent, FairnessEvaluator, FairnessResult};
pub use group::{
    audit_groups, group_rates, rate_gap, AuditError, AuditRecord, GroupAudit, GroupMetricsError,
    GroupRates, ProtectedAttribute, RateGap,
};
