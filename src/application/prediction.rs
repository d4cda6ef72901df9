//! Prediction service: Orchestrates vector assembly and model inference.
//!
//! This service coordinates:
//! - Startup check that the model and schema agree on column layout
//! - Schema-aligned vector assembly
//! - Probability or scalar prediction
//! - Risk categorization

use std::sync::Arc;

use crate::domain::{
    AlignedFeatureVector, AppointmentForm, Assessment, FeatureError, FeatureSchema,
    FeatureVectorBuilder, Forecast, RawInputRecord,
};
use crate::ports::{InferenceError, InferenceModel};
use crate::NoshowError;

/// Refuse a model whose input layout differs from the schema.
fn check_alignment<M: InferenceModel>(
    schema: &FeatureSchema,
    model: &M,
) -> Result<(), FeatureError> {
    if model.input_len() != schema.len() {
        return Err(FeatureError::SchemaViolation(format!(
            "model expects {} features, schema declares {}",
            model.input_len(),
            schema.len()
        )));
    }

    if let Some(trained) = model.feature_names() {
        if trained.len() != schema.len() {
            return Err(FeatureError::SchemaViolation(format!(
                "model was trained on {} named features, schema declares {}",
                trained.len(),
                schema.len()
            )));
        }

        let divergence = schema
            .names()
            .zip(trained.iter())
            .enumerate()
            .find(|(_, (declared, trained))| declared != trained);

        if let Some((index, (declared, trained))) = divergence {
            return Err(FeatureError::SchemaViolation(format!(
                "column {index} is '{declared}' in the schema but '{trained}' in the model"
            )));
        }
    }

    Ok(())
}

/// Service for running predictions against one model and its schema.
///
/// Holds only shared, read-only state; wrap it in an `Arc` and call it from
/// as many threads as needed.
pub struct PredictionService<M>
where
    M: InferenceModel,
{
    builder: FeatureVectorBuilder,
    model: Arc<M>,
}

impl<M> PredictionService<M>
where
    M: InferenceModel,
{
    /// Create a new prediction service.
    ///
    /// # Errors
    /// Returns `SchemaViolation` if the schema is empty or does not match the
    /// model's input width or trained column order.
    pub fn new(schema: Arc<FeatureSchema>, model: Arc<M>) -> Result<Self, NoshowError> {
        check_alignment(&schema, model.as_ref())?;
        let builder = FeatureVectorBuilder::new(schema)?;

        tracing::info!(
            "Prediction service ready: {} features, schema fingerprint {}",
            builder.schema().len(),
            &builder.schema().fingerprint()[..16]
        );

        Ok(Self { builder, model })
    }

    /// Reject records with fields the schema does not name.
    #[must_use]
    pub fn with_strict_fields(mut self, strict: bool) -> Self {
        self.builder = self.builder.strict(strict);
        self
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        self.builder.schema()
    }

    /// Build the aligned vector for a record.
    ///
    /// # Errors
    /// Returns the builder's `FeatureError`.
    pub fn prepare(&self, raw: &RawInputRecord) -> Result<AlignedFeatureVector, NoshowError> {
        let unknown = self.builder.unknown_fields(raw);
        if !unknown.is_empty() && !self.builder.is_strict() {
            tracing::warn!("Ignoring fields not in schema: {}", unknown.join(", "));
        }

        let vector = self.builder.build(raw)?;
        let defaulted = self.defaulted(raw);
        tracing::debug!(
            "Built feature vector: {} supplied, {} defaulted",
            self.schema().len() - defaulted,
            defaulted
        );
        Ok(vector)
    }

    fn defaulted(&self, raw: &RawInputRecord) -> usize {
        self.schema()
            .names()
            .filter(|name| !raw.contains(name))
            .count()
    }

    /// Run the no-show classifier and band the class-1 probability.
    ///
    /// # Errors
    /// Returns error if the record is invalid, the model cannot produce
    /// probabilities, or the probability falls outside `[0, 1]`.
    pub fn assess(&self, raw: &RawInputRecord) -> Result<Assessment, NoshowError> {
        let vector = self.prepare(raw)?;
        self.assess_vector(&vector)
    }

    /// Assess an already prepared vector.
    ///
    /// # Errors
    /// As [`Self::assess`], minus record validation.
    pub fn assess_vector(&self, vector: &AlignedFeatureVector) -> Result<Assessment, NoshowError> {
        let [_, no_show] = self.model.predict_probability(vector)?;
        if !no_show.is_finite() {
            return Err(InferenceError::NonFinite.into());
        }

        let assessment = Assessment::from_probability(no_show)?;
        tracing::info!(
            "Assessment complete: probability={:.1}%, risk={}",
            assessment.percent(),
            assessment.category
        );
        Ok(assessment)
    }

    /// Validate and encode a form, then assess it.
    ///
    /// # Errors
    /// `Validation` for out-of-range form fields, otherwise as [`Self::assess`].
    pub fn assess_form(&self, form: &AppointmentForm) -> Result<Assessment, NoshowError> {
        form.validate()
            .map_err(|errors| NoshowError::Validation(errors.join("; ")))?;
        self.assess(&form.to_record())
    }

    /// Run a count/demand regressor.
    ///
    /// # Errors
    /// Returns error if the record is invalid or the model fails.
    pub fn forecast(&self, raw: &RawInputRecord) -> Result<Forecast, NoshowError> {
        let vector = self.prepare(raw)?;
        let value = self.model.predict(&vector)?;
        if !value.is_finite() {
            return Err(InferenceError::NonFinite.into());
        }

        tracing::info!("Forecast complete: value={value:.2}");
        Ok(Forecast::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ExportedLinearModel, LinearModel, ModelTask};
    use crate::domain::{FeatureSlot, Gender, RiskCategory, Shift};

    /// Returns a fixed class-1 probability and records nothing.
    struct FixedModel {
        width: usize,
        probability: f64,
    }

    impl InferenceModel for FixedModel {
        fn input_len(&self) -> usize {
            self.width
        }

        fn predict(&self, _features: &AlignedFeatureVector) -> Result<f64, InferenceError> {
            Ok(f64::from(u8::from(self.probability >= 0.5)))
        }

        fn predict_probability(
            &self,
            _features: &AlignedFeatureVector,
        ) -> Result<[f64; 2], InferenceError> {
            Ok([1.0 - self.probability, self.probability])
        }
    }

    /// Reports a full input width but only some of its trained names.
    struct PartiallyNamedModel {
        width: usize,
        names: Vec<String>,
    }

    impl InferenceModel for PartiallyNamedModel {
        fn input_len(&self) -> usize {
            self.width
        }

        fn feature_names(&self) -> Option<&[String]> {
            Some(&self.names)
        }

        fn predict(&self, _features: &AlignedFeatureVector) -> Result<f64, InferenceError> {
            Ok(0.0)
        }
    }

    fn noshow_schema() -> Arc<FeatureSchema> {
        Arc::new(
            FeatureSchema::new(vec![
                FeatureSlot::integer("age").non_negative(),
                FeatureSlot::categorical("gender", Some(2)),
                FeatureSlot::categorical("SMSreceived", Some(2)),
                FeatureSlot::integer("place").non_negative(),
                FeatureSlot::integer("specialty").non_negative(),
                FeatureSlot::categorical("appointment_shift", Some(3)),
            ])
            .expect("valid schema"),
        )
    }

    fn linear(task: ModelTask, names: &[&str]) -> LinearModel {
        LinearModel::from_exported(ExportedLinearModel {
            task,
            feature_names: names.iter().map(|s| (*s).to_string()).collect(),
            coefficients: vec![0.0; names.len()],
            intercept: 0.0,
            decision_threshold: 0.5,
        })
        .expect("valid model")
    }

    #[test]
    fn test_assess_bands_probability() {
        let model = Arc::new(FixedModel {
            width: 6,
            probability: 0.55,
        });
        let service = PredictionService::new(noshow_schema(), model).expect("aligned");

        let assessment = service
            .assess(&RawInputRecord::new().with("age", 35))
            .expect("should assess");
        assert_eq!(assessment.category, RiskCategory::Medium);
        assert!((assessment.probability - 0.55).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let model = Arc::new(FixedModel {
            width: 6,
            probability: 1.2,
        });
        let service = PredictionService::new(noshow_schema(), model).expect("aligned");
        assert!(matches!(
            service.assess(&RawInputRecord::new()),
            Err(NoshowError::Feature(FeatureError::RangeViolation(_)))
        ));
    }

    #[test]
    fn test_width_mismatch_refused_at_startup() {
        let model = Arc::new(FixedModel {
            width: 8,
            probability: 0.1,
        });
        assert!(matches!(
            PredictionService::new(noshow_schema(), model),
            Err(NoshowError::Feature(FeatureError::SchemaViolation(_)))
        ));
    }

    #[test]
    fn test_swapped_columns_refused_at_startup() {
        // Trained with specialty before place; schema says place first.
        let model = Arc::new(linear(
            ModelTask::Classification,
            &["age", "gender", "SMSreceived", "specialty", "place", "appointment_shift"],
        ));
        match PredictionService::new(noshow_schema(), model) {
            Err(NoshowError::Feature(FeatureError::SchemaViolation(msg))) => {
                assert!(msg.contains("column 3"), "unexpected message: {msg}");
            }
            other => panic!("expected SchemaViolation, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_trained_name_count_must_match_schema() {
        let schema = Arc::new(FeatureSchema::from_names(["a", "b", "c"]).expect("schema"));

        for names in [vec!["a"], vec!["a", "b", "c", "d"]] {
            let model = Arc::new(PartiallyNamedModel {
                width: 3,
                names: names.into_iter().map(String::from).collect(),
            });
            assert!(matches!(
                PredictionService::new(Arc::clone(&schema), model),
                Err(NoshowError::Feature(FeatureError::SchemaViolation(_)))
            ));
        }

        let model = Arc::new(PartiallyNamedModel {
            width: 3,
            names: vec!["a".into(), "b".into(), "c".into()],
        });
        assert!(PredictionService::new(schema, model).is_ok());
    }

    #[test]
    fn test_assess_form_validates_first() {
        let model = Arc::new(FixedModel {
            width: 6,
            probability: 0.2,
        });
        let service = PredictionService::new(noshow_schema(), model).expect("aligned");

        let form = AppointmentForm {
            age: 101,
            gender: Gender::Female,
            sms_received: true,
            specialty: 2,
            place: 9,
            shift: Shift::Evening,
        };
        assert!(matches!(
            service.assess_form(&form),
            Err(NoshowError::Validation(_))
        ));

        let ok = AppointmentForm { age: 40, ..form };
        assert_eq!(
            service.assess_form(&ok).expect("valid form").category,
            RiskCategory::Low
        );
    }

    #[test]
    fn test_strict_fields() {
        let model = Arc::new(FixedModel {
            width: 6,
            probability: 0.2,
        });
        let service = PredictionService::new(noshow_schema(), model)
            .expect("aligned")
            .with_strict_fields(true);
        let raw = RawInputRecord::new().with("age", 30).with("scholarship", 1);
        assert!(matches!(
            service.assess(&raw),
            Err(NoshowError::Feature(FeatureError::SchemaViolation(_)))
        ));
    }

    #[test]
    fn test_forecast_with_regressor() {
        let schema = Arc::new(FeatureSchema::from_names(["day_of_week", "month"]).expect("schema"));
        let model = Arc::new(
            LinearModel::from_exported(ExportedLinearModel {
                task: ModelTask::Regression,
                feature_names: vec!["day_of_week".into(), "month".into()],
                coefficients: vec![3.0, 0.5],
                intercept: 100.0,
                decision_threshold: 0.5,
            })
            .expect("valid model"),
        );
        let service = PredictionService::new(schema, model).expect("aligned");

        let forecast = service
            .forecast(&RawInputRecord::new().with("day_of_week", 2).with("month", 6))
            .expect("should forecast");
        assert!((forecast.value - 109.0).abs() < 1e-9);

        // A regressor has no probability output.
        assert!(matches!(
            service.assess(&RawInputRecord::new()),
            Err(NoshowError::Inference(InferenceError::Unsupported(_)))
        ));
    }
}
