//! Shared loading helpers for on-disk model artifacts.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::domain::FeatureError;

/// Artifacts above this size are refused before parsing.
pub const MAX_ARTIFACT_BYTES: u64 = 4 * 1024 * 1024;

/// Errors from loading schema or model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact {} is {size} bytes (limit {limit})", .path.display(), limit = MAX_ARTIFACT_BYTES)]
    TooLarge { path: PathBuf, size: u64 },

    #[error("Invalid artifact format in {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model parameters: {0}")]
    InvalidModel(String),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Read and deserialize a JSON artifact, enforcing the size limit.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_ARTIFACT_BYTES {
        return Err(ArtifactError::TooLarge {
            path: path.to_path_buf(),
            size,
        });
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Format {
        path: path.to_path_buf(),
        source,
    })
}
