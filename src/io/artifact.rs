//! Read model artifact JSON files (tests also write them).
//!
//! An artifact is the portable representation of a trained regressor:
//! - the feature names it was trained on (optional, checked when present)
//! - the model itself (`linear` / `decision_tree` / `random_forest`)
//!
//! Any failure to read, parse or validate is `ModelUnavailable`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::FEATURE_NAMES;
use crate::error::PredictError;
use crate::models::RegressionModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub model: RegressionModel,
}

impl ModelArtifact {
    pub fn new(model: RegressionModel) -> Self {
        Self {
            description: None,
            feature_names: Some(FEATURE_NAMES.iter().map(|s| s.to_string()).collect()),
            model,
        }
    }

    fn check(&self) -> Result<(), String> {
        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(format!(
                    "artifact features [{}] do not match the expected order [{}]",
                    names.join(", "),
                    FEATURE_NAMES.join(", ")
                ));
            }
        }
        self.model.validate()
    }
}

/// Read and validate a model artifact.
pub fn read_model_json(path: &Path) -> Result<ModelArtifact, PredictError> {
    let file = File::open(path)
        .map_err(|e| PredictError::unavailable(path, format!("failed to open artifact: {e}")))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PredictError::unavailable(path, format!("invalid artifact JSON: {e}")))?;
    artifact
        .check()
        .map_err(|reason| PredictError::unavailable(path, reason))?;
    Ok(artifact)
}

/// Write a model artifact (pretty-printed).
#[cfg(test)]
pub(crate) fn write_model_json(path: &Path, artifact: &ModelArtifact) -> Result<(), PredictError> {
    let file = File::create(path)
        .map_err(|e| PredictError::unavailable(path, format!("failed to create artifact: {e}")))?;
    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| PredictError::unavailable(path, format!("failed to write artifact: {e}")))
}
