//! Error taxonomy for feature vector assembly and risk categorization.

/// Errors raised by the pure core (`build`, `categorize`, schema construction).
///
/// Every variant is local to a single call; the core holds no state that a
/// failure could leave behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    /// The schema is empty or malformed.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// A raw value cannot be coerced to its slot's numeric type.
    #[error("Type mismatch for '{field}': expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// A value lies outside its documented interval.
    #[error("Range violation: {0}")]
    RangeViolation(String),
}

impl FeatureError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaViolation(msg.into())
    }

    pub(crate) fn range(msg: impl Into<String>) -> Self {
        Self::RangeViolation(msg.into())
    }
}
