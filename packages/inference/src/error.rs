//! Error types for inference invocation

use thiserror::Error;

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors surfaced to callers of the inference layer.
///
/// Messages are meant to be shown to users. Diagnostic detail such as exit
/// codes, captured stderr and filesystem paths is logged where the error is
/// produced and never carried in the message.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The prediction worker script is not on disk
    #[error("Inference script not available")]
    ScriptNotFound,

    /// The model artifact referenced by the model info is not on disk
    #[error("No trained model found")]
    ModelNotFound,

    /// The interpreter could not be started
    #[error("Could not start inference - check interpreter/runtime availability")]
    Spawn(#[source] std::io::Error),

    /// The worker exited with a non-zero status
    #[error("Inference failed - check model configuration")]
    WorkerFailed { exit_code: Option<i32> },

    /// The worker reported an error in its output payload
    #[error("{0}")]
    Worker(String),

    /// The worker output carried no predictions
    #[error("No predictions returned")]
    NoPredictions,

    /// The worker output could not be parsed
    #[error("Failed to parse results")]
    Parse(#[source] serde_json::Error),

    /// The worker did not finish within the time limit
    #[error("Inference timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The caller cancelled the inference
    #[error("Inference cancelled")]
    Cancelled,

    /// Waiting on the worker failed after it was started
    #[error("Inference process error")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// Configuration errors need operator action; retrying will not help.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            InferenceError::ScriptNotFound | InferenceError::ModelNotFound
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, InferenceError::Timeout { .. })
    }

    /// Stable machine readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            InferenceError::ScriptNotFound => "script_not_found",
            InferenceError::ModelNotFound => "model_not_found",
            InferenceError::Spawn(_) => "spawn_failed",
            InferenceError::WorkerFailed { .. } => "worker_failed",
            InferenceError::Worker(_) => "worker_error",
            InferenceError::NoPredictions => "no_predictions",
            InferenceError::Parse(_) => "parse_failed",
            InferenceError::Timeout { .. } => "timeout",
            InferenceError::Cancelled => "cancelled",
            InferenceError::Io(_) => "io",
        }
    }
}
