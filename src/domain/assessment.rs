//! Prediction results handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::error::FeatureError;
use super::risk::{categorize, RiskCategory};

/// Outcome of the no-show classifier for one appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Probability of a no-show (class 1), 0.0 to 1.0
    pub probability: f64,

    pub category: RiskCategory,

    pub assessed_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Create an assessment from the class-1 probability.
    ///
    /// # Errors
    /// `RangeViolation` if the probability is outside `[0, 1]`.
    pub fn from_probability(probability: f64) -> Result<Self, FeatureError> {
        Ok(Self {
            category: categorize(probability)?,
            probability,
            assessed_at: chrono::Utc::now(),
        })
    }

    /// Probability as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// Outcome of a count/demand regressor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Forecast {
    pub value: f64,

    pub forecast_at: chrono::DateTime<chrono::Utc>,
}

impl Forecast {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            forecast_at: chrono::Utc::now(),
        }
    }
}
