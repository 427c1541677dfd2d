//! Shared encode-and-predict logic used by both CLI and TUI front-ends.
//!
//! Workflow for one request:
//! storey-range encode -> feature vector -> model inference -> price
//!
//! The CLI and the TUI then focus on presentation (printing vs widgets).

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::unsync::OnceCell;

use crate::domain::{FeatureVector, FormRecord, PredictionResult, decode_storey_range};
use crate::error::PredictError;
use crate::io::read_model_json;
use crate::models::Regressor;

/// Everything computed for one submitted form.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutput {
    pub record: FormRecord,
    pub features: FeatureVector,
    pub decoded_storey_range: &'static str,
    pub result: PredictionResult,
}

/// Run one prediction against an already-available model.
pub fn run_prediction<M: Regressor + ?Sized>(
    model: &M,
    record: &FormRecord,
) -> Result<PredictionOutput, PredictError> {
    // 1) Encode the only categorical field and assemble the vector in
    //    training order.
    let features = FeatureVector::from_record(record)?;
    let rank = features.storey_rank();
    debug!(
        "event=encode storey_range=\"{}\" rank={rank}",
        record.storey_range
    );
    debug!("event=features vector={features}");

    // 2) Inference.
    let raw = model.predict(features.as_slice())?;
    debug!("event=inference raw={raw}");

    // 3) Validate and wrap.
    let result = PredictionResult::new(raw)?;
    let decoded_storey_range = decode_storey_range(rank)?;

    Ok(PredictionOutput {
        record: record.clone(),
        features,
        decoded_storey_range,
        result,
    })
}

/// Owns the model artifact location and the lazily loaded model.
///
/// A successful load happens at most once; a failed load is not cached so the
/// next request tries again.
pub struct Predictor {
    model_path: PathBuf,
    model: OnceCell<Box<dyn Regressor>>,
}

impl Predictor {
    pub fn from_path(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            model: OnceCell::new(),
        }
    }

    /// Build a predictor around a model that is already in memory.
    pub fn with_model(model: impl Regressor + 'static) -> Self {
        let boxed: Box<dyn Regressor> = Box::new(model);
        Self {
            model_path: PathBuf::new(),
            model: OnceCell::with_value(boxed),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn model(&self) -> Result<&dyn Regressor, PredictError> {
        let model = self.model.get_or_try_init(|| {
            let artifact = read_model_json(&self.model_path)?;
            info!(
                "event=model_load status=ok kind=\"{}\" path={}",
                artifact.model.display_name(),
                self.model_path.display()
            );
            Ok::<Box<dyn Regressor>, PredictError>(Box::new(artifact.model))
        })?;
        Ok(model.as_ref())
    }

    /// Encode, assemble and infer for one record.
    pub fn predict(&self, record: &FormRecord) -> Result<PredictionOutput, PredictError> {
        let outcome = self.model().and_then(|model| run_prediction(model, record));
        match &outcome {
            Ok(out) => info!("event=predict status=ok price={:.2}", out.result.price()),
            Err(err) => warn!("event=predict status=error kind={} detail=\"{err}\"", err.kind()),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::domain::sample_record;
    use crate::io::{ModelArtifact, write_model_json};
    use crate::models::{LinearModel, RegressionModel};

    struct FixedModel(f64);

    impl Regressor for FixedModel {
        fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
            assert_eq!(features, &[3.0, 5.0, 2.0, 123.0, 45.0, 1.0, 3.0, 90.0, 1990.0, 2020.0]);
            Ok(self.0)
        }
    }

    struct CountingModel<'a>(&'a Cell<usize>);

    impl Regressor for CountingModel<'_> {
        fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
            self.0.set(self.0.get() + 1);
            Ok(features.iter().sum())
        }
    }

    struct FailingModel;

    impl Regressor for FailingModel {
        fn predict(&self, _features: &[f64]) -> Result<f64, PredictError> {
            Err(PredictError::inference("boom"))
        }
    }

    #[test]
    fn scenario_record_predicts_fixed_price() {
        let out = run_prediction(&FixedModel(350_000.0), &sample_record()).unwrap();
        assert_eq!(out.features.storey_rank(), 1);
        assert_eq!(out.decoded_storey_range, "04 TO 06");
        assert_eq!(out.result.price(), 350_000.0);
        assert_eq!(out.result.to_string(), "$350,000");
    }

    #[test]
    fn unknown_storey_range_never_reaches_the_model() {
        let calls = Cell::new(0);
        let mut record = sample_record();
        record.storey_range = "NOT A RANGE".to_string();

        let err = run_prediction(&CountingModel(&calls), &record).unwrap_err();
        assert!(matches!(err, PredictError::UnknownCategory { .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn model_failure_is_inference_error() {
        let err = run_prediction(&FailingModel, &sample_record()).unwrap_err();
        assert_eq!(err, PredictError::inference("boom"));
    }

    #[test]
    fn repeated_prediction_is_identical() {
        let predictor = Predictor::with_model(FixedModel(412_000.0));
        let first = predictor.predict(&sample_record()).unwrap();
        let second = predictor.predict(&sample_record()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Predictor::from_path(dir.path().join("does-not-exist.json"));

        let err = predictor.predict(&sample_record()).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable { .. }));
        assert!(err.user_message().starts_with("An error occurred:"));
        assert!(!predictor.is_loaded());
    }

    #[test]
    fn failed_load_is_retried_on_next_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let predictor = Predictor::from_path(&path);
        assert!(predictor.predict(&sample_record()).is_err());

        let mut coefficients = vec![0.0; 10];
        coefficients[7] = 4_000.0;
        let artifact = ModelArtifact::new(RegressionModel::Linear(LinearModel {
            intercept: 10_000.0,
            coefficients,
        }));
        write_model_json(&path, &artifact).unwrap();

        let out = predictor.predict(&sample_record()).unwrap();
        assert_eq!(out.result.to_string(), "$370,000");
        assert!(predictor.is_loaded());
    }

    #[test]
    fn loaded_model_is_not_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let artifact = ModelArtifact::new(RegressionModel::Linear(LinearModel {
            intercept: 200_000.0,
            coefficients: vec![0.0; 10],
        }));
        write_model_json(&path, &artifact).unwrap();

        let predictor = Predictor::from_path(&path);
        let first = predictor.predict(&sample_record()).unwrap();

        std::fs::remove_file(&path).unwrap();
        let second = predictor.predict(&sample_record()).unwrap();
        assert_eq!(first.result, second.result);
    }

    #[test]
    fn negative_model_output_is_rejected() {
        let err = run_prediction(&FixedModel(-5.0), &sample_record()).unwrap_err();
        assert!(matches!(err, PredictError::InferenceError(_)));
    }
}
