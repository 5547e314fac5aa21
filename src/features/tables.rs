//! Lookup tables - categorical value → survey code
//!
//! Every table is total: a value it does not know resolves to the table's
//! default code. Tables are plain values handed to the mapper at
//! construction, so tests and schemas can carry their own variants.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// DEFAULT CODES
// ============================================================================

/// SCHL code for "HS-grad"
pub const DEFAULT_EDUCATION_CODE: i64 = 16;

/// MAR code for "Never-married"
pub const DEFAULT_MARITAL_CODE: i64 = 5;

/// OCCP code for a computer scientist
pub const DEFAULT_OCCUPATION_CODE: i64 = 1021;

// ============================================================================
// LOOKUP TABLE
// ============================================================================

/// Fixed categorical lookup with an explicit fallback code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    entries: HashMap<String, i64>,
    default: i64,
}

impl LookupTable {
    pub fn new(default: i64) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    pub fn from_pairs(default: i64, pairs: &[(&str, i64)]) -> Self {
        pairs
            .iter()
            .fold(Self::new(default), |table, &(key, code)| table.with(key, code))
    }

    pub fn with(mut self, key: &str, code: i64) -> Self {
        self.entries.insert(key.to_string(), code);
        self
    }

    /// Code for `key`, or the default when the key is unknown
    pub fn code(&self, key: &str) -> i64 {
        self.entries.get(key).copied().unwrap_or(self.default)
    }

    pub fn default_code(&self) -> i64 {
        self.default
    }
}

// ============================================================================
// TABLE SETS
// ============================================================================

/// All lookups one schema needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    pub education: LookupTable,
    pub marital: LookupTable,
    pub occupation: LookupTable,
    pub race: LookupTable,
    pub sex: LookupTable,
    pub nativity: LookupTable,
    pub work_class: LookupTable,
}

impl LookupTables {
    /// Tables of the UCI classifier and the ACS point regressor
    pub fn acs() -> Self {
        Self {
            education: LookupTable::from_pairs(
                DEFAULT_EDUCATION_CODE,
                &[
                    ("Bachelors", 21),
                    ("HS-grad", 16),
                    ("Masters", 22),
                    ("Doctorate", 24),
                    ("Some-college", 19),
                    ("Associate", 20),
                ],
            ),
            marital: LookupTable::from_pairs(
                DEFAULT_MARITAL_CODE,
                &[("Never-married", 5), ("Married-civ-spouse", 1), ("Divorced", 3)],
            ),
            occupation: LookupTable::from_pairs(
                DEFAULT_OCCUPATION_CODE,
                &[("Computer Science", 1021), ("Engineering", 1721), ("Business", 1110)],
            ),
            // White vs everyone else
            race: LookupTable::from_pairs(2, &[("White", 1)]),
            sex: LookupTable::from_pairs(2, &[("Male", 1)]),
            nativity: LookupTable::from_pairs(2, &[("United-States", 1)]),
            work_class: LookupTable::from_pairs(1, &[("Private", 1)]),
        }
    }

    /// Tables of the ACS quantile regressors.
    ///
    /// Superset of [`LookupTables::acs`]: also accepts the education and
    /// occupation buckets the survey ingestion produces, full marital and
    /// race codes, and class of worker.
    pub fn acs_extended() -> Self {
        let base = Self::acs();

        Self {
            education: base
                .education
                .with("Less than HS", 15)
                .with("High School/Some College", 16),
            marital: base.marital.with("Widowed", 2).with("Separated", 4),
            occupation: base
                .occupation
                .with("Management & Business", 10)
                .with("Tech & Engineering", 1021)
                .with("Healthcare", 3255)
                .with("Sales & Office", 4700)
                .with("Service & Blue Collar", 6230)
                .with("Other", 2000),
            race: LookupTable::from_pairs(
                8,
                &[
                    ("White", 1),
                    ("Black", 2),
                    ("Amer-Indian-Eskimo", 3),
                    ("Asian-Pac-Islander", 6),
                    ("Other", 8),
                ],
            ),
            sex: base.sex,
            nativity: base.nativity,
            work_class: LookupTable::from_pairs(
                1,
                &[
                    ("Private", 1),
                    ("Local-gov", 3),
                    ("State-gov", 4),
                    ("Federal-gov", 5),
                    ("Self-emp-not-inc", 6),
                    ("Self-emp-inc", 7),
                    ("Without-pay", 8),
                ],
            ),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
