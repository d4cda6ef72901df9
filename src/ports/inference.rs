//! Inference port: Trait for trained model prediction.
//!
//! The model is a black box. This crate never trains, inspects or serializes
//! it; it only hands it schema-aligned vectors.

use crate::domain::AlignedFeatureVector;

/// Errors that can occur when calling a trained model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Model does not support {0}")]
    Unsupported(&'static str),

    #[error("Input width mismatch: model expects {expected}, got {got}")]
    WidthMismatch { expected: usize, got: usize },

    #[error("Model returned a non-finite value")]
    NonFinite,

    #[error("Inference failed: {0}")]
    Failed(String),
}

/// Trait for a trained classifier or regressor.
///
/// Implementations must be callable from many threads at once; prediction
/// takes `&self`.
pub trait InferenceModel: Send + Sync {
    /// Number of input features the model was trained on.
    fn input_len(&self) -> usize;

    /// Column names in training order, when the artifact records them.
    ///
    /// Used at startup to refuse a schema whose layout differs from the
    /// model's.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Scalar prediction (class label for classifiers, value for regressors).
    ///
    /// # Errors
    /// Returns `InferenceError` if the vector width is wrong or the model fails.
    fn predict(&self, features: &AlignedFeatureVector) -> Result<f64, InferenceError>;

    /// Class probabilities `[p(class 0), p(class 1)]`.
    ///
    /// # Errors
    /// `Unsupported` for models without a probability output.
    fn predict_probability(
        &self,
        features: &AlignedFeatureVector,
    ) -> Result<[f64; 2], InferenceError> {
        let _ = features;
        Err(InferenceError::Unsupported("probability prediction"))
    }
}
