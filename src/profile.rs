//! User profile - the raw, human-readable input to every prediction
//!
//! The request layer only checks structure and ranges here. Semantic
//! defaulting of absent fields belongs to the feature mapper.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Sampling weight used when the caller does not send one
pub const DEFAULT_FNLWGT: i64 = 1;

/// Weekly hours assumed when not supplied
pub const DEFAULT_HOURS_PER_WEEK: u32 = 40;

pub const DEFAULT_RELATIONSHIP: &str = "Not-in-family";

pub const DEFAULT_CAPITAL: i64 = 0;

pub const DEFAULT_NATIVE_COUNTRY: &str = "United-States";

// ============================================================================
// PROFILE
// ============================================================================

/// Self-reported demographic and employment attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_u32_any")]
    #[validate(range(min = 1, max = 100))]
    pub age: u32,

    pub education_level: String,

    pub work_class: String,

    pub marital_status: String,

    pub sex: String,

    pub race: String,

    /// Field of study, or an occupation bucket for the ACS range schema
    #[serde(alias = "occupation_category")]
    pub major: String,

    #[serde(default)]
    pub native_country: Option<String>,

    #[serde(default, deserialize_with = "deserialize_opt_u32_any")]
    #[validate(range(min = 1, max = 168))]
    pub hours_per_week: Option<u32>,

    #[serde(default)]
    pub fnlwgt: Option<i64>,

    #[serde(default)]
    pub relationship: Option<String>,

    #[serde(default)]
    pub capital_gain: Option<i64>,

    #[serde(default)]
    pub capital_loss: Option<i64>,
}

impl UserProfile {
    pub fn hours_per_week_or_default(&self) -> u32 {
        self.hours_per_week.unwrap_or(DEFAULT_HOURS_PER_WEEK)
    }

    pub fn native_country_or_default(&self) -> &str {
        self.native_country.as_deref().unwrap_or(DEFAULT_NATIVE_COUNTRY)
    }

    pub fn relationship_or_default(&self) -> &str {
        self.relationship.as_deref().unwrap_or(DEFAULT_RELATIONSHIP)
    }

    // ------------------------------------------------------------------------
    // Counterfactual copies
    // ------------------------------------------------------------------------

    /// Copy with `sex` toggled Male <-> Female.
    ///
    /// Any value other than "Male" or "Female" becomes "Male".
    pub fn with_sex_flipped(&self) -> Self {
        let sex = match self.sex.as_str() {
            "Male" => "Female",
            _ => "Male",
        };
        Self {
            sex: sex.to_string(),
            ..self.clone()
        }
    }

    /// Copy with `race` swapped: "White" becomes "Black", everything else
    /// becomes "White".
    ///
    /// Only {"White", "Black"} round-trips; e.g. "Asian-Pac-Islander" goes
    /// to "White" and then to "Black".
    pub fn with_race_swapped(&self) -> Self {
        let race = match self.race.as_str() {
            "White" => "Black",
            _ => "White",
        };
        Self {
            race: race.to_string(),
            ..self.clone()
        }
    }
}

// ============================================================================
// LENIENT NUMBERS
// ============================================================================

// Form inputs post numbers as strings ("45")
fn u32_from_value(value: Value) -> Result<u32, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("invalid unsigned integer: {}", n)),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid unsigned integer: {:?}", s)),
        other => Err(format!("expected an unsigned integer, got {}", other)),
    }
}

fn deserialize_u32_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    u32_from_value(Value::deserialize(deserializer)?).map_err(SerdeError::custom)
}

/// `null` and blank strings read as absent
fn deserialize_opt_u32_any<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        value => u32_from_value(value).map(Some).map_err(SerdeError::custom),
    }
}

// ============================================================================
// TESTS
// ============================================================================
