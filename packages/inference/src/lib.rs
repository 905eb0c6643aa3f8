//! EcoBuild Inference
//!
//! Runs the out-of-process material classifier for scanned images:
//! - resolves a Python interpreter (bundled virtual environment, then system)
//! - spawns the prediction worker with a hard timeout
//! - parses, labels and ranks the worker's predictions
//! - falls back to a simulated result when no real model can be used
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ecobuild_inference::{InferenceConfig, InferenceService, ModelInfo};
//!
//! let service = InferenceService::new(InferenceConfig::from_env());
//! let model = ModelInfo::from_model_dir("data/models/abc123".as_ref()).unwrap();
//! let result = service.predict("uploads/scan.jpg".as_ref(), &model).await?;
//! ```

pub mod config;
pub mod error;
pub mod interpreter;
pub mod invoker;
pub mod labels;
pub mod model;
pub mod output;
pub mod router;
pub mod service;
pub mod simulation;
pub mod types;

pub use config::InferenceConfig;
pub use error::{InferenceError, InferenceResult};
pub use interpreter::{BundledVenv, InterpreterResolver, InterpreterStrategy, SystemLookup};
pub use invoker::InferenceInvoker;
pub use model::{ModelInfo, check_model_availability};
pub use router::{InferenceState, inference_router};
pub use service::{InferenceService, ModelStatus};
pub use simulation::{simulate_prediction, simulate_with_rng};
pub use tokio_util::sync::CancellationToken;
pub use types::{Prediction, PredictionResult, TOP_N};
