//! # noshow
//!
//! Schema-aligned feature vectors and risk bands for appointment no-show
//! prediction.
//!
//! A trained model expects its inputs in one exact column order. Building
//! that vector by position at each call site silently corrupts predictions
//! the moment a column is added, dropped or swapped. This crate builds it
//! by schema lookup instead, with defaults declared once in the schema.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Pure types and logic (schema, `build`, `categorize`)
//! - `ports`: Trait definitions for the trained model and schema source
//! - `adapters`: JSON artifact loaders and log sanitization
//! - `application`: Prediction service and background worker
//! - `config`: Environment-driven settings for the binary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{
    build, categorize, AlignedFeatureVector, FeatureError, FeatureSchema, RawInputRecord,
    RiskCategory,
};

/// Result type for noshow operations
pub type Result<T> = std::result::Result<T, NoshowError>;

/// Main error type for noshow
#[derive(Debug, thiserror::Error)]
pub enum NoshowError {
    #[error("Feature error: {0}")]
    Feature(#[from] domain::FeatureError),

    #[error("Inference error: {0}")]
    Inference(#[from] ports::InferenceError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Invalid input: {0}")]
    Validation(String),
}
