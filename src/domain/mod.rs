//! Domain layer: Core types and pure logic.
//!
//! Nothing in here logs, performs I/O or holds mutable state. Schema
//! alignment (`build`) and risk banding (`categorize`) are the two entry
//! points the presentation layer calls.

pub mod appointment;
mod assessment;
mod builder;
mod error;
mod record;
mod risk;
mod schema;
mod vector;

pub use appointment::{AppointmentForm, ChoiceError, Gender, Shift};
pub use assessment::{Assessment, Forecast};
pub use builder::{build, FeatureVectorBuilder};
pub use error::FeatureError;
pub use record::{RawInputRecord, RawValue};
pub use risk::{categorize, RiskCategory, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
pub use schema::{FeatureKind, FeatureSchema, FeatureSlot};
pub use vector::AlignedFeatureVector;
