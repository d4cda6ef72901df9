//! Risk categorization of a no-show probability.

use serde::{Deserialize, Serialize};

use super::error::FeatureError;

/// Probabilities strictly above this are `High`.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probabilities strictly above this (and not `High`) are `Medium`.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

/// Discrete no-show risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Patient likely to attend
    Low,
    /// A reminder is worthwhile
    Medium,
    /// Strong chance of no-show
    High,
}

impl RiskCategory {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Patient likely to attend",
            Self::Medium => "Medium risk - Consider reminder",
            Self::High => "High risk - Strong chance of no-show",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Classify a probability into a risk band.
///
/// Boundaries are exclusive on the lower side of each band: `0.4` is `Low`
/// and `0.7` is `Medium`.
///
/// # Errors
/// `RangeViolation` if `probability` is outside `[0.0, 1.0]` or NaN.
pub fn categorize(probability: f64) -> Result<RiskCategory, FeatureError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(FeatureError::range(format!(
            "probability {probability} outside [0, 1]"
        )));
    }

    Ok(if probability > HIGH_RISK_THRESHOLD {
        RiskCategory::High
    } else if probability > MEDIUM_RISK_THRESHOLD {
        RiskCategory::Medium
    } else {
        RiskCategory::Low
    })
}
