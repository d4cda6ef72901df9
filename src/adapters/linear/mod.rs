//! Linear model adapter: Implementation of InferenceModel.
//!
//! Evaluates a linear model exported by the training pipeline as JSON:
//! a logistic classifier (no-show) or an identity-link regressor (demand).
//!
//! The exported `feature_names` are the model's own record of its column
//! order. They are surfaced through `InferenceModel::feature_names` so the
//! application can refuse a schema that lays the columns out differently.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::artifact::{read_json, ArtifactError};
use crate::domain::AlignedFeatureVector;
use crate::ports::{InferenceError, InferenceModel};

/// Upper bound on model width, as a sanity check on exported artifacts.
const MAX_FEATURES: usize = 512;

fn default_decision_threshold() -> f64 {
    0.5
}

/// What the exported model predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTask {
    /// Binary classifier with a logistic link.
    Classification,
    /// Regressor with an identity link.
    Regression,
}

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLinearModel {
    pub task: ModelTask,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,

    /// Class-1 probability at which `predict` returns 1.
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
}

/// A loaded, validated linear model.
#[derive(Debug, Clone)]
pub struct LinearModel {
    model: ExportedLinearModel,
}

impl LinearModel {
    /// Validate exported parameters.
    ///
    /// # Errors
    /// Returns `ArtifactError::InvalidModel` on inconsistent lengths,
    /// duplicate names, non-finite parameters, or a threshold outside (0, 1).
    pub fn from_exported(model: ExportedLinearModel) -> Result<Self, ArtifactError> {
        let n = model.feature_names.len();
        if n == 0 || n > MAX_FEATURES {
            return Err(ArtifactError::InvalidModel(format!(
                "Invalid feature count in model: got {n}, max {MAX_FEATURES}"
            )));
        }
        if model.coefficients.len() != n {
            return Err(ArtifactError::InvalidModel(format!(
                "{} coefficients for {n} feature names",
                model.coefficients.len()
            )));
        }

        let mut seen = HashSet::with_capacity(n);
        if let Some(dup) = model.feature_names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(ArtifactError::InvalidModel(format!(
                "duplicate feature name '{dup}'"
            )));
        }

        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::InvalidModel(
                "non-finite coefficient or intercept".into(),
            ));
        }
        if !(model.decision_threshold > 0.0 && model.decision_threshold < 1.0) {
            return Err(ArtifactError::InvalidModel(format!(
                "decision threshold {} outside (0, 1)",
                model.decision_threshold
            )));
        }

        Ok(Self { model })
    }

    /// Load model parameters from a JSON export.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let exported: ExportedLinearModel = read_json(path)?;
        let model = Self::from_exported(exported)?;

        tracing::info!(
            "Loaded {:?} model from {} ({} features)",
            model.model.task,
            path.display(),
            model.model.feature_names.len()
        );
        Ok(model)
    }

    #[must_use]
    pub fn task(&self) -> ModelTask {
        self.model.task
    }

    /// Linear predictor `w·x + b`.
    fn score(&self, features: &AlignedFeatureVector) -> Result<f64, InferenceError> {
        let expected = self.model.coefficients.len();
        if features.len() != expected {
            return Err(InferenceError::WidthMismatch {
                expected,
                got: features.len(),
            });
        }

        let z = self
            .model
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.model.intercept;

        if z.is_finite() {
            Ok(z)
        } else {
            Err(InferenceError::NonFinite)
        }
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let e = z.exp();
            e / (1.0 + e)
        }
    }
}

impl InferenceModel for LinearModel {
    fn input_len(&self) -> usize {
        self.model.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.model.feature_names)
    }

    fn predict(&self, features: &AlignedFeatureVector) -> Result<f64, InferenceError> {
        match self.model.task {
            ModelTask::Regression => self.score(features),
            ModelTask::Classification => {
                let [_, p1] = self.predict_probability(features)?;
                Ok(if p1 >= self.model.decision_threshold {
                    1.0
                } else {
                    0.0
                })
            }
        }
    }

    fn predict_probability(
        &self,
        features: &AlignedFeatureVector,
    ) -> Result<[f64; 2], InferenceError> {
        match self.model.task {
            ModelTask::Classification => {
                let p1 = Self::sigmoid(self.score(features)?);
                Ok([1.0 - p1, p1])
            }
            ModelTask::Regression => Err(InferenceError::Unsupported(
                "probability prediction on a regressor",
            )),
        }
    }
}
