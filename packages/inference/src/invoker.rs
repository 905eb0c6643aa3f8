//! Out-of-process prediction worker invocation
//!
//! One call spawns one worker. The call resolves exactly once: worker exit,
//! timeout and cancellation race in a single `select!`, and the losing
//! branches are dropped. Timeout and cancellation kill and reap the child.

use crate::config::InferenceConfig;
use crate::error::{InferenceError, InferenceResult};
use crate::interpreter::InterpreterResolver;
use crate::model::{ModelInfo, check_model_availability};
use crate::output::parse_worker_output;
use crate::types::PredictionResult;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs the prediction worker for a model
#[derive(Clone)]
pub struct InferenceInvoker {
    config: Arc<InferenceConfig>,
    resolver: Arc<InterpreterResolver>,
}

impl InferenceInvoker {
    pub fn new(config: Arc<InferenceConfig>, resolver: Arc<InterpreterResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn from_config(config: InferenceConfig) -> Self {
        let resolver = InterpreterResolver::from_config(&config);
        Self::new(Arc::new(config), Arc::new(resolver))
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Run one prediction with the configured timeout.
    pub async fn predict(
        &self,
        image_path: &Path,
        model: &ModelInfo,
    ) -> InferenceResult<PredictionResult> {
        self.predict_with_cancel(image_path, model, CancellationToken::new())
            .await
    }

    /// Run one prediction that can also be cancelled through `cancel`.
    pub async fn predict_with_cancel(
        &self,
        image_path: &Path,
        model: &ModelInfo,
        cancel: CancellationToken,
    ) -> InferenceResult<PredictionResult> {
        let script = &self.config.worker_script;
        if !check_model_availability(script) {
            tracing::warn!(script = %script.display(), "Inference script not found");
            return Err(InferenceError::ScriptNotFound);
        }

        if !check_model_availability(&model.model_path) {
            tracing::warn!(model = %model.model_path.display(), "Model artifact not found");
            return Err(InferenceError::ModelNotFound);
        }

        let interpreter = self.resolver.resolve().await;

        let mut command = Command::new(&interpreter);
        command
            .arg(script)
            .arg("--image")
            .arg(image_path)
            .arg("--model")
            .arg(&model.model_path)
            .arg("--labels")
            .arg(&model.labels_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = command.spawn().map_err(|e| {
            tracing::error!(
                interpreter = %interpreter.display(),
                error = %e,
                "Failed to start inference process"
            );
            InferenceError::Spawn(e)
        })?;

        tracing::info!(
            pid = ?child.id(),
            image = %image_path.display(),
            model = %model.model_path.display(),
            "Started inference worker"
        );

        let mut stdout_task = spawn_collector(child.stdout.take());
        let mut stderr_task = spawn_collector(child.stderr.take());
        let timeout = self.config.inference_timeout();
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        // Draining counts against the deadline: a process left behind by the
        // worker can hold the pipes open after the worker itself exits.
        let outcome = tokio::select! {
            finished = async {
                let status = child.wait().await;
                let stdout = collect(&mut stdout_task).await;
                let stderr = collect(&mut stderr_task).await;
                (status, stdout, stderr)
            } => Outcome::Finished(finished),
            _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
            _ = cancel.cancelled() => Outcome::Cancelled,
        };

        let (status, stdout, stderr) = match outcome {
            Outcome::Finished((status, stdout, stderr)) => (status?, stdout, stderr),
            Outcome::TimedOut => {
                terminate(&mut child, &stdout_task, &stderr_task).await;
                tracing::warn!(timeout_ms, "Inference timed out");
                return Err(InferenceError::Timeout {
                    duration_ms: timeout_ms,
                });
            }
            Outcome::Cancelled => {
                terminate(&mut child, &stdout_task, &stderr_task).await;
                tracing::info!("Inference cancelled");
                return Err(InferenceError::Cancelled);
            }
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !status.success() {
            tracing::error!(
                exit_code = ?status.code(),
                stderr = %stderr.trim(),
                duration_ms,
                "Inference worker failed"
            );
            return Err(InferenceError::WorkerFailed {
                exit_code: status.code(),
            });
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Inference worker stderr");
        }

        let result = parse_worker_output(&stdout, &self.config.default_model_name)?;
        tracing::info!(
            class = %result.top_prediction.class,
            confidence = result.top_prediction.confidence,
            model = %result.model_used,
            duration_ms,
            "Inference completed"
        );
        Ok(result)
    }
}

enum Outcome {
    Finished((std::io::Result<std::process::ExitStatus>, String, String)),
    TimedOut,
    Cancelled,
}

/// Accumulate a child stream as it arrives.
fn spawn_collector<R>(stream: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            let mut chunk = [0u8; 8192];
            loop {
                match stream.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                    Err(e) => {
                        tracing::debug!(error = %e, "Stopped reading worker stream");
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

async fn collect(task: &mut JoinHandle<String>) -> String {
    task.await.unwrap_or_default()
}

async fn terminate(child: &mut Child, stdout: &JoinHandle<String>, stderr: &JoinHandle<String>) {
    // Already reaped when only the drain overran the deadline.
    if !matches!(child.try_wait(), Ok(Some(_))) {
        if let Err(e) = child.kill().await {
            tracing::warn!(error = %e, "Failed to kill inference worker");
        }
    }
    stdout.abort();
    stderr.abort();
}
