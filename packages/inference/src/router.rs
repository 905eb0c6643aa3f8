//! Axum routes for the inference service

use crate::error::InferenceError;
use crate::model::ModelInfo;
use crate::service::{InferenceService, ModelStatus};
use crate::simulation::simulate_prediction;
use crate::types::PredictionResult;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared router state
#[derive(Clone)]
pub struct InferenceState {
    pub service: InferenceService,
}

impl InferenceState {
    pub fn new(service: InferenceService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub image_path: PathBuf,
    /// Trained model directory; the active model is used when absent
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
}

/// HTTP mapping of inference errors
pub enum ApiError {
    BadRequest(String),
    Inference(InferenceError),
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        ApiError::Inference(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Inference(e) => {
                let (status, error) = if e.is_configuration() {
                    (StatusCode::SERVICE_UNAVAILABLE, "No AI model available")
                } else if e.is_timeout() {
                    (StatusCode::GATEWAY_TIMEOUT, "AI prediction failed")
                } else {
                    (StatusCode::BAD_GATEWAY, "AI prediction failed")
                };
                let body = json!({
                    "error": error,
                    "message": e.to_string(),
                    "code": e.code(),
                    "modelRequired": e.is_configuration(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Construct the inference router with all endpoints
pub fn inference_router(state: InferenceState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/model-status", get(model_status))
        .route("/predict", post(predict))
        .route("/predict/simulate", post(predict_simulated))
        .with_state(Arc::new(state))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "ecobuild-inference".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn model_status(State(state): State<Arc<InferenceState>>) -> Json<ModelStatus> {
    Json(state.service.model_status().await)
}

/// POST /predict
///
/// Runs the prediction worker on an image already stored on this host.
async fn predict(
    State(state): State<Arc<InferenceState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>, ApiError> {
    if !tokio::fs::try_exists(&request.image_path)
        .await
        .unwrap_or(false)
    {
        return Err(ApiError::BadRequest("No image provided".to_string()));
    }

    let model = match &request.model_dir {
        Some(dir) => ModelInfo::locate(dir.clone()).await,
        None => state.service.active_model().await,
    };

    let result = state
        .service
        .predict_or_simulate(&request.image_path, model.as_ref())
        .await?;
    Ok(Json(result))
}

/// POST /predict/simulate
async fn predict_simulated() -> Json<PredictionResult> {
    Json(simulate_prediction())
}
