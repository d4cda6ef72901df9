//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with on-disk artifacts and
//! the logging stack:
//! - `schema_file`: JSON feature schema loader
//! - `linear`: JSON-exported linear / logistic models
//! - `sanitize`: identifier filtering for logs

mod artifact;
pub mod linear;
pub mod sanitize;
pub mod schema_file;

pub use artifact::{ArtifactError, MAX_ARTIFACT_BYTES};
pub use linear::{ExportedLinearModel, LinearModel, ModelTask};
pub use schema_file::JsonSchemaFile;
