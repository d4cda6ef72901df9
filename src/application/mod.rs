//! Application layer: Use cases and services.
//!
//! This module wires the pure domain logic to the model port and adds the
//! logging the domain deliberately leaves out.

mod prediction;
mod worker;

pub use prediction::PredictionService;
pub use worker::{PredictionHandle, PredictionProgress, PredictionWorker};
