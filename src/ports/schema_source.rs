//! Schema source port: where the feature layout comes from.

use crate::domain::FeatureSchema;

/// Trait for loading the feature schema a model was trained with.
///
/// Called once during process initialization; the result is shared
/// read-only for the rest of the process lifetime.
pub trait SchemaSource {
    /// Error type for loading.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the schema.
    ///
    /// # Errors
    /// Returns error if the source is unreadable or describes an invalid or
    /// empty schema.
    fn load_schema(&self) -> Result<FeatureSchema, Self::Error>;
}
