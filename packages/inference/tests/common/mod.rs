#![allow(dead_code)]

use async_trait::async_trait;
use ecobuild_inference::{InferenceConfig, InterpreterResolver, InterpreterStrategy, ModelInfo};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Resolves to a fixed interpreter and counts how often it was asked
pub struct CountingStrategy {
    pub path: PathBuf,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl InterpreterStrategy for CountingStrategy {
    fn name(&self) -> &str {
        "counting"
    }

    async fn resolve(&self) -> Option<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(self.path.clone())
    }
}

pub fn resolver(interpreter: &str) -> (InterpreterResolver, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let resolver = InterpreterResolver::new(
        vec![Box::new(CountingStrategy {
            path: PathBuf::from(interpreter),
            calls: calls.clone(),
        })],
        "/nonexistent/python",
    );
    (resolver, calls)
}

/// Scratch directory holding a fake worker, a model, labels and an image
pub struct Fixture {
    pub dir: TempDir,
    pub script: PathBuf,
    pub image: PathBuf,
    pub model: ModelInfo,
}

impl Fixture {
    /// `body` is run by `/bin/sh` with the worker arguments in `$@`
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("predict.sh");
        std::fs::write(&script, body).unwrap();

        let model_dir = dir.path().join("models").join("abc123");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("model.keras"), b"weights").unwrap();
        std::fs::write(model_dir.join("labels.json"), r#"{"0": "bricks", "1": "timber"}"#)
            .unwrap();

        let image = dir.path().join("scan.jpg");
        std::fs::write(&image, b"jpeg").unwrap();

        let model = ModelInfo::from_model_dir(&model_dir).unwrap();
        Self {
            dir,
            script,
            image,
            model,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> InferenceConfig {
        InferenceConfig::default()
            .with_worker_script(&self.script)
            .with_timeout(Duration::from_secs(20))
    }
}

pub fn echo_json(json: &str) -> String {
    format!("cat <<'JSON'\n{json}\nJSON\n")
}
