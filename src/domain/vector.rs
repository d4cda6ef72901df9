//! Aligned feature vectors: model input in schema order.

use serde::Serialize;

use super::schema::FeatureSchema;

/// Numeric model input whose length and order match a `FeatureSchema`.
///
/// Only `build` produces these, so a vector in hand is never short and never
/// reordered relative to the schema it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlignedFeatureVector {
    values: Vec<f64>,
}

impl AlignedFeatureVector {
    pub(crate) fn from_aligned(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Pair each value with its slot name.
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = (&'a str, f64)> {
        schema.names().zip(self.iter())
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for AlignedFeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
