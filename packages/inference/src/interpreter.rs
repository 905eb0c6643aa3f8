//! Interpreter resolution for the prediction worker
//!
//! Strategies are tried in order; the first one that yields a validated path
//! wins. When none does, the resolver hands back its fallback path and the
//! spawn failure is observed downstream.

use crate::config::InferenceConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// One way of finding an interpreter
#[async_trait]
pub trait InterpreterStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// A usable interpreter path, or `None` to fall through to the next strategy.
    async fn resolve(&self) -> Option<PathBuf>;
}

/// Interpreter path inside a virtual environment for the current platform
pub fn venv_interpreter_path(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}

/// Run a short-lived diagnostic process under a timeout.
///
/// The child is killed if the timeout elapses first.
async fn run_probe(command: &mut Command, timeout: Duration) -> Option<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Some(output),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Probe could not be started");
            None
        }
        Err(_) => {
            tracing::debug!(timeout = ?timeout, "Probe timed out");
            None
        }
    }
}

/// The project's bundled virtual environment, validated with `--version`
pub struct BundledVenv {
    venv_dir: PathBuf,
    timeout: Duration,
}

impl BundledVenv {
    pub fn new(venv_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            venv_dir: venv_dir.into(),
            timeout,
        }
    }

    pub fn candidate(&self) -> PathBuf {
        venv_interpreter_path(&self.venv_dir)
    }
}

#[async_trait]
impl InterpreterStrategy for BundledVenv {
    fn name(&self) -> &str {
        "bundled-venv"
    }

    async fn resolve(&self) -> Option<PathBuf> {
        let candidate = self.candidate();
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return None;
        }

        let output = run_probe(Command::new(&candidate).arg("--version"), self.timeout).await?;
        if output.status.success() {
            Some(candidate)
        } else {
            tracing::debug!(
                path = %candidate.display(),
                exit_code = ?output.status.code(),
                "Bundled interpreter failed version check"
            );
            None
        }
    }
}

/// A system interpreter found through the platform's executable lookup
pub struct SystemLookup {
    command: String,
    program: String,
    timeout: Duration,
}

impl SystemLookup {
    /// `where python` on Windows, `which python3` elsewhere
    pub fn platform_default(timeout: Duration) -> Self {
        if cfg!(windows) {
            Self::with_command("where", "python", timeout)
        } else {
            Self::with_command("which", "python3", timeout)
        }
    }

    pub fn with_command(
        command: impl Into<String>,
        program: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl InterpreterStrategy for SystemLookup {
    fn name(&self) -> &str {
        "system-lookup"
    }

    async fn resolve(&self) -> Option<PathBuf> {
        let output = run_probe(Command::new(&self.command).arg(&self.program), self.timeout).await?;
        if !output.status.success() {
            return None;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
    }
}

/// Ordered list of strategies plus a last-resort path
pub struct InterpreterResolver {
    strategies: Vec<Box<dyn InterpreterStrategy>>,
    fallback: PathBuf,
}

impl InterpreterResolver {
    pub fn new(strategies: Vec<Box<dyn InterpreterStrategy>>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            strategies,
            fallback: fallback.into(),
        }
    }

    /// Bundled venv first, then the system interpreter, falling back to the venv path
    pub fn from_config(config: &InferenceConfig) -> Self {
        let venv = BundledVenv::new(config.venv_dir.clone(), config.probe_timeout());
        let fallback = venv.candidate();
        Self::new(
            vec![
                Box::new(venv),
                Box::new(SystemLookup::platform_default(config.probe_timeout())),
            ],
            fallback,
        )
    }

    /// Never fails; degrades to the fallback path.
    pub async fn resolve(&self) -> PathBuf {
        for strategy in &self.strategies {
            if let Some(path) = strategy.resolve().await {
                tracing::debug!(strategy = strategy.name(), path = %path.display(), "Resolved interpreter");
                return path;
            }
        }

        tracing::warn!(
            path = %self.fallback.display(),
            "No interpreter found, using fallback path"
        );
        self.fallback.clone()
    }
}
