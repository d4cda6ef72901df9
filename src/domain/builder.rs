//! Feature vector assembly.
//!
//! Walks the schema in its declared order and looks each slot up by name in
//! the raw record. There is no positional construction anywhere: a vector is
//! always produced by schema lookup, with absent slots filled from the
//! schema's declared defaults.

use std::sync::Arc;

use super::error::FeatureError;
use super::record::RawInputRecord;
use super::schema::FeatureSchema;
use super::vector::AlignedFeatureVector;

/// Translate a raw record into a vector aligned with `schema`.
///
/// Fields in `raw` that the schema does not name are ignored.
///
/// # Errors
/// - `SchemaViolation` if the schema is empty.
/// - `TypeMismatch` if a present value cannot be coerced to its slot's type.
/// - `RangeViolation` if a present value is outside its slot's interval.
pub fn build(
    schema: &FeatureSchema,
    raw: &RawInputRecord,
) -> Result<AlignedFeatureVector, FeatureError> {
    schema.ensure_non_empty()?;

    let values = schema
        .slots()
        .iter()
        .map(|slot| match raw.get(&slot.name) {
            Some(value) => slot.accept(value),
            None => Ok(slot.default),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(AlignedFeatureVector::from_aligned(values))
}

/// Schema-bound builder shared by every request in a process.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: Arc<FeatureSchema>,
    strict: bool,
}

impl FeatureVectorBuilder {
    /// Bind a builder to a loaded schema.
    ///
    /// # Errors
    /// `SchemaViolation` if the schema is empty.
    pub fn new(schema: Arc<FeatureSchema>) -> Result<Self, FeatureError> {
        schema.ensure_non_empty()?;
        Ok(Self {
            schema,
            strict: false,
        })
    }

    /// Reject records carrying fields the schema does not name.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Field names in `raw` that no slot consumes, sorted.
    #[must_use]
    pub fn unknown_fields<'a>(&self, raw: &'a RawInputRecord) -> Vec<&'a str> {
        let mut unknown: Vec<&str> = raw
            .keys()
            .filter(|k| self.schema.slot(k).is_none())
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// # Errors
    /// As [`build`]; in strict mode also `SchemaViolation` for unknown fields.
    pub fn build(&self, raw: &RawInputRecord) -> Result<AlignedFeatureVector, FeatureError> {
        if self.strict {
            let unknown = self.unknown_fields(raw);
            if !unknown.is_empty() {
                return Err(FeatureError::schema(format!(
                    "fields not in schema: {}",
                    unknown.join(", ")
                )));
            }
        }
        build(&self.schema, raw)
    }
}
