//! Survey bucketing - numeric ACS codes → human-readable buckets
//!
//! The reverse direction of the lookup tables, used when raw survey rows are
//! summarised into the categories the UI offers.

use std::ops::Range;

pub const OTHER_BUCKET: &str = "Other";

// ============================================================================
// EDUCATION (SCHL)
// ============================================================================

/// Bucket for an ACS SCHL educational attainment code
pub fn education_bucket(schl_code: i64) -> &'static str {
    match schl_code {
        c if c < 16 => "Less than HS",
        16..=20 => "High School/Some College",
        21 => "Bachelors",
        22 | 23 => "Masters",
        24 => "Doctorate",
        _ => OTHER_BUCKET,
    }
}

// ============================================================================
// OCCUPATION (OCCP)
// ============================================================================

/// Ordered half-open OCCP ranges; the first match wins.
///
/// [4100, 4700) overlaps two entries and resolves to "Service & Blue
/// Collar".
const OCCUPATION_RANGES: &[(Range<i64>, &str)] = &[
    (10..1000, "Management & Business"),
    (1000..2000, "Tech & Engineering"),
    (2900..3600, "Healthcare"),
    (3600..4700, "Service & Blue Collar"),
    (4100..6000, "Sales & Office"),
    (6000..10000, "Service & Blue Collar"),
];

/// Industry bucket for a 4-digit OCCP code
pub fn occupation_bucket(occp_code: i64) -> &'static str {
    OCCUPATION_RANGES
        .iter()
        .find(|(range, _)| range.contains(&occp_code))
        .map(|(_, bucket)| *bucket)
        .unwrap_or(OTHER_BUCKET)
}

/// Every bucket `occupation_bucket` can return, without duplicates
pub fn occupation_buckets() -> Vec<&'static str> {
    let mut buckets: Vec<&'static str> = Vec::new();
    for (_, bucket) in OCCUPATION_RANGES {
        if !buckets.contains(bucket) {
            buckets.push(*bucket);
        }
    }
    buckets.push(OTHER_BUCKET);
    buckets
}

// ============================================================================
// TESTS
// ============================================================================
