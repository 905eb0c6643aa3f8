//! Shared inference entry point used by the HTTP router and the CLI

use crate::config::InferenceConfig;
use crate::error::{InferenceError, InferenceResult};
use crate::interpreter::InterpreterResolver;
use crate::invoker::InferenceInvoker;
use crate::model::ModelInfo;
use crate::simulation::simulate_prediction;
use crate::types::PredictionResult;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Status of the configured active model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ActiveModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub simulation_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveModel {
    pub id: String,
    pub artifact: String,
    pub classes: Vec<String>,
}

#[derive(Clone)]
pub struct InferenceService {
    invoker: InferenceInvoker,
    limiter: Option<Arc<Semaphore>>,
}

impl InferenceService {
    pub fn new(config: InferenceConfig) -> Self {
        let resolver = InterpreterResolver::from_config(&config);
        Self::with_resolver(config, resolver)
    }

    pub fn with_resolver(config: InferenceConfig, resolver: InterpreterResolver) -> Self {
        let limiter = config
            .max_concurrent_workers
            .map(|permits| Arc::new(Semaphore::new(permits)));
        Self {
            invoker: InferenceInvoker::new(Arc::new(config), Arc::new(resolver)),
            limiter,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        self.invoker.config()
    }

    /// The model in the configured active model directory, if one is there
    pub async fn active_model(&self) -> Option<ModelInfo> {
        let dir = self.config().active_model_dir.clone()?;
        ModelInfo::locate(dir).await
    }

    pub async fn model_status(&self) -> ModelStatus {
        let simulation_enabled = self.config().allow_simulation;
        match self.active_model().await {
            Some(model) => ModelStatus {
                available: true,
                model: Some(ActiveModel {
                    id: model.model_id().unwrap_or_else(|| "unknown".to_string()),
                    artifact: model
                        .model_path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    classes: model.classes,
                }),
                message: None,
                simulation_enabled,
            },
            None => ModelStatus {
                available: false,
                model: None,
                message: Some(if simulation_enabled {
                    "No trained model is active. The scanner is running in simulation mode."
                        .to_string()
                } else {
                    "No trained model is active. Train and activate a model first.".to_string()
                }),
                simulation_enabled,
            },
        }
    }

    pub async fn predict(
        &self,
        image_path: &Path,
        model: &ModelInfo,
    ) -> InferenceResult<PredictionResult> {
        self.predict_with_cancel(image_path, model, CancellationToken::new())
            .await
    }

    /// Real inference, waiting for a worker slot when a limit is configured.
    pub async fn predict_with_cancel(
        &self,
        image_path: &Path,
        model: &ModelInfo,
        cancel: CancellationToken,
    ) -> InferenceResult<PredictionResult> {
        let _permit = match &self.limiter {
            Some(limiter) => tokio::select! {
                permit = limiter.clone().acquire_owned() => permit.ok(),
                _ = cancel.cancelled() => return Err(InferenceError::Cancelled),
            },
            None => None,
        };

        self.invoker
            .predict_with_cancel(image_path, model, cancel)
            .await
    }

    /// Real inference when possible, otherwise a simulated result if allowed.
    ///
    /// Without a model, or when the real call fails, the simulation is served
    /// only when `allow_simulation` is set; else the error is returned.
    pub async fn predict_or_simulate(
        &self,
        image_path: &Path,
        model: Option<&ModelInfo>,
    ) -> InferenceResult<PredictionResult> {
        let allow_simulation = self.config().allow_simulation;

        let Some(model) = model else {
            if allow_simulation {
                tracing::info!("No model available, serving simulated prediction");
                return Ok(simulate_prediction());
            }
            return Err(InferenceError::ModelNotFound);
        };

        match self.predict(image_path, model).await {
            Ok(result) => Ok(result),
            Err(e) if allow_simulation => {
                tracing::warn!(error = %e, code = e.code(), "Inference failed, serving simulated prediction");
                Ok(simulate_prediction())
            }
            Err(e) => Err(e),
        }
    }
}
