//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the core and the trained model artifacts it consumes.

mod inference;
mod schema_source;

pub use inference::{InferenceError, InferenceModel};
pub use schema_source::SchemaSource;
