//! Parsing of the prediction worker's stdout payload
//!
//! The worker prints a single JSON object:
//! `{ "predictions": [{ "class": "...", "confidence": 0.9 }], "model"?: "...", "error"?: "..." }`

use crate::error::{InferenceError, InferenceResult};
use crate::types::{Prediction, PredictionResult};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct WorkerOutput {
    #[serde(default)]
    predictions: Option<Value>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    class: String,
    confidence: f64,
}

/// Turn raw worker stdout into a ranked, labelled result.
///
/// Confidences are passed through as reported.
pub fn parse_worker_output(stdout: &str, default_model: &str) -> InferenceResult<PredictionResult> {
    let output: WorkerOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
        tracing::error!(error = %e, stdout_len = stdout.len(), "Failed to parse worker output");
        InferenceError::Parse(e)
    })?;

    if let Some(message) = output.error {
        tracing::warn!(error = %message, "Worker reported an error");
        return Err(InferenceError::Worker(message));
    }

    let items = match output.predictions {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(InferenceError::NoPredictions),
    };

    let raw: Vec<RawPrediction> =
        serde_json::from_value(Value::Array(items)).map_err(|e| {
            tracing::error!(error = %e, "Worker predictions have an unexpected shape");
            InferenceError::Parse(e)
        })?;

    let predictions = raw
        .into_iter()
        .map(|p| Prediction::new(p.class, p.confidence))
        .collect();

    let model_used = output.model.unwrap_or_else(|| default_model.to_string());
    PredictionResult::from_predictions(predictions, model_used, false)
        .ok_or(InferenceError::NoPredictions)
}
