use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the inference layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Path to the prediction worker script
    #[serde(default = "default_worker_script")]
    pub worker_script: PathBuf,
    /// Project bundled virtual environment
    #[serde(default = "default_venv_dir")]
    pub venv_dir: PathBuf,
    /// Wall-clock limit for one worker run (milliseconds)
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_timeout_ms: u64,
    /// Limit for interpreter probes (milliseconds)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Model label reported when the worker does not name one
    #[serde(default = "default_model_name")]
    pub default_model_name: String,
    /// Directory of the active trained model, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_model_dir: Option<PathBuf>,
    /// Serve a simulated result when no real prediction can be made
    #[serde(default)]
    pub allow_simulation: bool,
    /// Maximum number of worker processes running at once (unset = unlimited)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_workers: Option<usize>,
}

fn default_worker_script() -> PathBuf {
    PathBuf::from("MLStudio-main").join("worker").join("predict.py")
}
fn default_venv_dir() -> PathBuf {
    PathBuf::from(".venv")
}
fn default_inference_timeout_ms() -> u64 {
    60_000
}
fn default_probe_timeout_ms() -> u64 {
    2_000
}
fn default_model_name() -> String {
    "MLStudio Model".to_string()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            worker_script: default_worker_script(),
            venv_dir: default_venv_dir(),
            inference_timeout_ms: default_inference_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            default_model_name: default_model_name(),
            active_model_dir: None,
            allow_simulation: false,
            max_concurrent_workers: None,
        }
    }
}

impl InferenceConfig {
    pub fn from_env() -> Self {
        Self {
            worker_script: std::env::var("INFERENCE_WORKER_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_worker_script()),
            venv_dir: std::env::var("INFERENCE_VENV_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_venv_dir()),
            inference_timeout_ms: std::env::var("INFERENCE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_inference_timeout_ms),
            probe_timeout_ms: std::env::var("INFERENCE_PROBE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_probe_timeout_ms),
            default_model_name: std::env::var("INFERENCE_DEFAULT_MODEL_NAME")
                .unwrap_or_else(|_| default_model_name()),
            active_model_dir: std::env::var("INFERENCE_MODEL_DIR").ok().map(PathBuf::from),
            allow_simulation: std::env::var("INFERENCE_ALLOW_SIMULATION")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            max_concurrent_workers: std::env::var("INFERENCE_MAX_CONCURRENT_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0),
        }
    }

    pub fn with_worker_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.worker_script = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_active_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.active_model_dir = Some(dir.into());
        self
    }

    pub fn with_simulation(mut self, allow: bool) -> Self {
        self.allow_simulation = allow;
        self
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InferenceConfig::default();
        assert_eq!(config.inference_timeout(), Duration::from_secs(60));
        assert_eq!(config.probe_timeout(), Duration::from_secs(2));
        assert_eq!(config.default_model_name, "MLStudio Model");
        assert!(config.worker_script.ends_with("predict.py"));
        assert!(!config.allow_simulation);
        assert!(config.max_concurrent_workers.is_none());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: InferenceConfig =
            serde_json::from_str(r#"{"inference_timeout_ms": 500, "allow_simulation": true}"#)
                .unwrap();
        assert_eq!(config.inference_timeout(), Duration::from_millis(500));
        assert!(config.allow_simulation);
        assert_eq!(config.venv_dir, PathBuf::from(".venv"));
    }

    #[test]
    fn test_with_timeout_saturates() {
        let config = InferenceConfig::default().with_timeout(Duration::from_millis(1500));
        assert_eq!(config.inference_timeout_ms, 1500);

        let config = InferenceConfig::default().with_timeout(Duration::MAX);
        assert_eq!(config.inference_timeout_ms, u64::MAX);
    }
}
