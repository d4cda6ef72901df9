//! Feature schema: the ordered, immutable slot layout a trained model expects.
//!
//! The slot order comes from the model artifact. Nothing in this crate infers
//! or reorders it; `build` walks the slots exactly as declared here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::FeatureError;
use super::record::RawValue;

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Numeric type of a feature slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Whole numbers (counts, ages).
    Integer,
    /// Any finite real number.
    #[default]
    Real,
    /// A category already encoded as a non-negative integer code.
    Categorical,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Real => write!(f, "real"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// One named, typed position in the model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSlot {
    /// Column name as the model was trained with it.
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: FeatureKind,

    /// Value used when the caller does not supply this field.
    #[serde(default)]
    pub default: f64,

    /// Reject negative values (ages, codes).
    #[serde(default)]
    pub non_negative: bool,

    /// Number of valid codes for a categorical slot (`0..levels`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<u32>,
}

impl FeatureSlot {
    fn with_kind(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: 0.0,
            non_negative: false,
            levels: None,
        }
    }

    #[must_use]
    pub fn real(name: impl Into<String>) -> Self {
        Self::with_kind(name, FeatureKind::Real)
    }

    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::with_kind(name, FeatureKind::Integer)
    }

    /// Categorical slot; `levels` bounds the accepted codes when known.
    #[must_use]
    pub fn categorical(name: impl Into<String>, levels: Option<u32>) -> Self {
        Self {
            levels,
            ..Self::with_kind(name, FeatureKind::Categorical)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }

    #[must_use]
    pub fn non_negative(mut self) -> Self {
        self.non_negative = true;
        self
    }

    /// Coerce a raw value into this slot's numeric representation.
    ///
    /// # Errors
    /// `TypeMismatch` when the value cannot be represented as this slot's
    /// kind, `RangeViolation` when it is negative for a non-negative slot or
    /// outside a categorical slot's declared levels.
    pub fn accept(&self, value: &RawValue) -> Result<f64, FeatureError> {
        let x = match (self.kind, value) {
            (_, RawValue::Text(s)) => return Err(self.mismatch(format!("text {s:?}"))),
            (_, RawValue::Bool(b)) => return Err(self.mismatch(format!("boolean {b}"))),
            (_, RawValue::Null) => return Err(self.mismatch("null".to_string())),
            (_, RawValue::Real(r)) if !r.is_finite() => {
                return Err(self.mismatch(format!("non-finite real {r}")))
            }
            (FeatureKind::Real, RawValue::Real(r)) => *r,
            // Checked in the integer domain: 2^53 + 1 rounds down to 2^53 as f64.
            (_, RawValue::Integer(i)) => {
                if i.unsigned_abs() > MAX_EXACT_INTEGER {
                    return Err(self.mismatch(format!("integer {i} beyond exact range")));
                }
                *i as f64
            }
            (_, RawValue::Real(r)) => {
                if r.fract() != 0.0 || r.abs() > MAX_EXACT_INTEGER as f64 {
                    return Err(self.mismatch(format!("real {r}")));
                }
                *r
            }
        };

        self.check_range(x)?;
        Ok(x)
    }

    fn check_range(&self, x: f64) -> Result<(), FeatureError> {
        let must_be_non_negative = self.non_negative || self.kind == FeatureKind::Categorical;
        if must_be_non_negative && x < 0.0 {
            return Err(FeatureError::range(format!(
                "'{}' must be non-negative, got {x}",
                self.name
            )));
        }
        if let Some(levels) = self.levels {
            if x >= f64::from(levels) {
                return Err(FeatureError::range(format!(
                    "'{}' code {x} outside [0, {levels})",
                    self.name
                )));
            }
        }
        Ok(())
    }

    fn mismatch(&self, found: String) -> FeatureError {
        FeatureError::TypeMismatch {
            field: self.name.clone(),
            expected: self.kind.to_string(),
            found,
        }
    }

    fn validate(&self) -> Result<(), FeatureError> {
        if self.name.trim().is_empty() {
            return Err(FeatureError::schema("slot name must not be empty"));
        }
        match self.levels {
            Some(0) => {
                return Err(FeatureError::schema(format!(
                    "'{}' declares zero levels",
                    self.name
                )))
            }
            Some(_) if self.kind != FeatureKind::Categorical => {
                return Err(FeatureError::schema(format!(
                    "'{}' declares levels but is {}",
                    self.name, self.kind
                )))
            }
            _ => {}
        }
        self.accept(&RawValue::Real(self.default))
            .map(|_| ())
            .map_err(|e| FeatureError::schema(format!("invalid default for '{}': {e}", self.name)))
    }
}

/// Ordered sequence of feature slots.
///
/// Construct once at startup and share behind an `Arc`; the type exposes no
/// mutation after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureSlot>", into = "Vec<FeatureSlot>")]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
}

impl FeatureSchema {
    /// Create a schema from slots in model order.
    ///
    /// An empty slot list is accepted here; it is rejected when a vector is
    /// built from it.
    ///
    /// # Errors
    /// `SchemaViolation` for blank or duplicate names, misplaced `levels`, or
    /// a default that does not satisfy its own slot.
    pub fn new(slots: Vec<FeatureSlot>) -> Result<Self, FeatureError> {
        let mut seen = HashSet::with_capacity(slots.len());
        for slot in &slots {
            slot.validate()?;
            if !seen.insert(slot.name.as_str()) {
                return Err(FeatureError::schema(format!(
                    "duplicate slot '{}'",
                    slot.name
                )));
            }
        }
        Ok(Self { slots })
    }

    /// Schema of real-valued slots defaulting to 0, from bare column names.
    ///
    /// # Errors
    /// `SchemaViolation` for blank or duplicate names.
    pub fn from_names<I, S>(names: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(FeatureSlot::real).collect())
    }

    #[must_use]
    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&FeatureSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// # Errors
    /// `SchemaViolation` when the schema has no slots.
    pub fn ensure_non_empty(&self) -> Result<(), FeatureError> {
        if self.is_empty() {
            return Err(FeatureError::schema("schema has no feature slots"));
        }
        Ok(())
    }

    /// SHA-256 over the ordered `(name, kind)` pairs, hex encoded.
    ///
    /// Two schemas with the same columns in a different order have different
    /// fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for slot in &self.slots {
            hasher.update(slot.name.as_bytes());
            hasher.update(b":");
            hasher.update(slot.kind.to_string().as_bytes());
            hasher.update(b"\n");
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl TryFrom<Vec<FeatureSlot>> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(slots: Vec<FeatureSlot>) -> Result<Self, Self::Error> {
        Self::new(slots)
    }
}

impl From<FeatureSchema> for Vec<FeatureSlot> {
    fn from(schema: FeatureSchema) -> Self {
        schema.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_rejected() {
        let err = FeatureSchema::from_names(["age", "gender", "age"]).unwrap_err();
        assert!(matches!(err, FeatureError::SchemaViolation(_)));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = FeatureSchema::from_names(["age", "  "]).unwrap_err();
        assert!(matches!(err, FeatureError::SchemaViolation(_)));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let slot = FeatureSlot::integer("age").non_negative().with_default(-1.0);
        assert!(matches!(
            FeatureSchema::new(vec![slot]),
            Err(FeatureError::SchemaViolation(_))
        ));

        let slot = FeatureSlot::integer("visits").with_default(1.5);
        assert!(matches!(
            FeatureSchema::new(vec![slot]),
            Err(FeatureError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_levels_only_on_categorical() {
        let mut slot = FeatureSlot::integer("shift");
        slot.levels = Some(3);
        assert!(FeatureSchema::new(vec![slot]).is_err());
        assert!(FeatureSchema::new(vec![FeatureSlot::categorical("shift", Some(0))]).is_err());
        assert!(FeatureSchema::new(vec![FeatureSlot::categorical("shift", Some(3))]).is_ok());
    }

    #[test]
    fn test_empty_schema_constructs_but_is_not_usable() {
        let schema = FeatureSchema::new(Vec::new()).expect("empty is representable");
        assert!(schema.is_empty());
        assert!(schema.ensure_non_empty().is_err());
    }

    #[test]
    fn test_accept_coercions() {
        let age = FeatureSlot::integer("age").non_negative();
        assert_eq!(age.accept(&RawValue::Integer(35)), Ok(35.0));
        assert_eq!(age.accept(&RawValue::Real(35.0)), Ok(35.0));
        assert!(matches!(
            age.accept(&RawValue::Real(35.5)),
            Err(FeatureError::TypeMismatch { .. })
        ));
        assert!(matches!(
            age.accept(&RawValue::Integer(-1)),
            Err(FeatureError::RangeViolation(_))
        ));

        let weight = FeatureSlot::real("weight");
        assert_eq!(weight.accept(&RawValue::Integer(70)), Ok(70.0));
        assert_eq!(weight.accept(&RawValue::Real(-2.5)), Ok(-2.5));
        assert!(matches!(
            weight.accept(&RawValue::Real(f64::NAN)),
            Err(FeatureError::TypeMismatch { .. })
        ));
        assert!(matches!(
            weight.accept(&RawValue::Text("heavy".into())),
            Err(FeatureError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_integers_beyond_exact_range_rejected_for_every_kind() {
        let exact = (1_i64 << 53) + 1;
        for slot in [
            FeatureSlot::real("weight"),
            FeatureSlot::integer("age"),
            FeatureSlot::categorical("code", None),
        ] {
            assert!(
                matches!(
                    slot.accept(&RawValue::Integer(exact)),
                    Err(FeatureError::TypeMismatch { .. })
                ),
                "{} slot accepted a rounded integer",
                slot.kind
            );
            assert!(matches!(
                slot.accept(&RawValue::Integer(-exact)),
                Err(FeatureError::TypeMismatch { .. })
            ));
        }

        let weight = FeatureSlot::real("weight");
        assert_eq!(
            weight.accept(&RawValue::Integer(1 << 53)),
            Ok(9_007_199_254_740_992.0)
        );
        assert_eq!(
            weight.accept(&RawValue::Integer(-(1 << 53))),
            Ok(-9_007_199_254_740_992.0)
        );
    }

    #[test]
    fn test_boolean_and_null_are_mismatches() {
        let sms = FeatureSlot::categorical("SMSreceived", Some(2));
        match sms.accept(&RawValue::Bool(true)) {
            Err(FeatureError::TypeMismatch { field, found, .. }) => {
                assert_eq!(field, "SMSreceived");
                assert_eq!(found, "boolean true");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
        assert!(matches!(
            sms.accept(&RawValue::Null),
            Err(FeatureError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_categorical_bounds() {
        let shift = FeatureSlot::categorical("appointment_shift", Some(3));
        assert_eq!(shift.accept(&RawValue::Integer(2)), Ok(2.0));
        assert!(matches!(
            shift.accept(&RawValue::Integer(3)),
            Err(FeatureError::RangeViolation(_))
        ));
        assert!(matches!(
            shift.accept(&RawValue::Integer(-1)),
            Err(FeatureError::RangeViolation(_))
        ));
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let a = FeatureSchema::from_names(["specialty", "place"]).expect("schema");
        let b = FeatureSchema::from_names(["place", "specialty"]).expect("schema");
        let a2 = FeatureSchema::from_names(["specialty", "place"]).expect("schema");
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a2.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[
            {"name": "age", "type": "integer", "non_negative": true},
            {"name": "gender", "type": "categorical", "levels": 2},
            {"name": "score"}
        ]"#;
        let schema: FeatureSchema = serde_json::from_str(json).expect("valid schema");
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.slots()[2].kind, FeatureKind::Real);
        assert_eq!(schema.position("gender"), Some(1));

        let dup = r#"[{"name": "age"}, {"name": "age"}]"#;
        assert!(serde_json::from_str::<FeatureSchema>(dup).is_err());
    }
}
