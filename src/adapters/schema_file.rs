//! JSON schema file adapter: Implementation of SchemaSource.
//!
//! Two layouts are accepted:
//!
//! ```json
//! { "features": [ { "name": "age", "type": "integer", "non_negative": true }, ... ] }
//! ```
//!
//! or a bare array of column names, exactly as a training pipeline dumps its
//! `feature_names`. Bare names become real-valued slots defaulting to 0.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::artifact::{read_json, ArtifactError};
use crate::domain::{FeatureSchema, FeatureSlot};
use crate::ports::SchemaSource;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Slots { features: Vec<FeatureSlot> },
    Names(Vec<String>),
}

impl SchemaDocument {
    fn into_schema(self) -> Result<FeatureSchema, ArtifactError> {
        let schema = match self {
            Self::Slots { features } => FeatureSchema::new(features)?,
            Self::Names(names) => FeatureSchema::from_names(names)?,
        };
        schema.ensure_non_empty()?;
        Ok(schema)
    }
}

/// Schema loaded from a JSON file next to the model artifact.
#[derive(Debug, Clone)]
pub struct JsonSchemaFile {
    path: PathBuf,
}

impl JsonSchemaFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for JsonSchemaFile {
    type Error = ArtifactError;

    fn load_schema(&self) -> Result<FeatureSchema, Self::Error> {
        let document: SchemaDocument = read_json(&self.path)?;
        let schema = document.into_schema()?;

        tracing::info!(
            "Loaded feature schema from {}: {} slots, fingerprint {}",
            self.path.display(),
            schema.len(),
            &schema.fingerprint()[..16]
        );
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureError, FeatureKind};
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write schema");
        path
    }

    #[test]
    fn test_load_slot_document() {
        let dir = tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "schema.json",
            r#"{"features": [
                {"name": "age", "type": "integer", "non_negative": true},
                {"name": "appointment_shift", "type": "categorical", "levels": 3, "default": 0}
            ]}"#,
        );

        let schema = JsonSchemaFile::new(path).load_schema().expect("should load");
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.slots()[0].kind, FeatureKind::Integer);
        assert!(schema.slots()[0].non_negative);
        assert_eq!(schema.slots()[1].levels, Some(3));
    }

    #[test]
    fn test_load_bare_names() {
        let dir = tempdir().expect("tempdir");
        let path = write(
            dir.path(),
            "features.json",
            r#"["age", "gender", "SMSreceived", "place", "specialty", "appointment_shift"]"#,
        );

        let schema = JsonSchemaFile::new(path).load_schema().expect("should load");
        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            vec!["age", "gender", "SMSreceived", "place", "specialty", "appointment_shift"]
        );
        assert!(schema.slots().iter().all(|s| s.default == 0.0));
    }

    #[test]
    fn test_empty_schema_refused() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "empty.json", "[]");

        let err = JsonSchemaFile::new(path).load_schema().unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Feature(FeatureError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_duplicate_columns_refused() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "dup.json", r#"["place", "specialty", "place"]"#);

        assert!(matches!(
            JsonSchemaFile::new(path).load_schema(),
            Err(ArtifactError::Feature(FeatureError::SchemaViolation(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().expect("tempdir");
        let err = JsonSchemaFile::new(dir.path().join("absent.json"))
            .load_schema()
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempdir().expect("tempdir");
        let path = write(dir.path(), "bad.json", r#"{"features": 3}"#);
        assert!(matches!(
            JsonSchemaFile::new(path).load_schema(),
            Err(ArtifactError::Format { .. })
        ));
    }
}
