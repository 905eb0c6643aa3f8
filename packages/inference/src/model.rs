//! Trained model metadata and availability checks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Artifact names probed in a model directory, in priority order
pub const MODEL_ARTIFACTS: &[&str] = &["model.keras", "best_model.keras"];
pub const LABELS_FILE: &str = "labels.json";
pub const DEFAULT_INPUT_SHAPE: [usize; 3] = [224, 224, 3];

/// Describes a trained classifier on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    /// Class identifiers in label index order
    #[serde(default)]
    pub classes: Vec<String>,
    /// Class identifier to label index
    #[serde(default)]
    pub class_indices: BTreeMap<String, usize>,
    #[serde(default = "default_input_shape")]
    pub input_shape: Vec<usize>,
}

fn default_input_shape() -> Vec<usize> {
    DEFAULT_INPUT_SHAPE.to_vec()
}

impl ModelInfo {
    pub fn new(model_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels_path: labels_path.into(),
            classes: Vec::new(),
            class_indices: BTreeMap::new(),
            input_shape: default_input_shape(),
        }
    }

    /// Locate the artifact and labels inside a trained model directory.
    ///
    /// Returns `None` when the directory holds no model artifact. Classes are
    /// filled from `labels.json` when it maps indices to class keys.
    pub fn from_model_dir(dir: &Path) -> Option<Self> {
        let model_path = MODEL_ARTIFACTS
            .iter()
            .map(|name| dir.join(name))
            .find(|path| check_model_availability(path))?;

        let labels_path = dir.join(LABELS_FILE);
        let mut info = Self::new(model_path, labels_path);

        if let Some(labels) = read_labels(&info.labels_path) {
            info.classes = labels.values().cloned().collect();
            info.class_indices = labels
                .into_iter()
                .map(|(idx, class)| (class, idx))
                .collect();
        }

        Some(info)
    }

    /// [`ModelInfo::from_model_dir`] on the blocking pool, for async callers.
    pub async fn locate(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        match tokio::task::spawn_blocking(move || Self::from_model_dir(&dir)).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, "Model lookup task failed");
                None
            }
        }
    }

    /// Identifier of the model, taken from its directory name
    pub fn model_id(&self) -> Option<String> {
        self.model_path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Index to class mapping from a labels file such as `{"0": "bricks"}`
fn read_labels(path: &Path) -> Option<BTreeMap<usize, String>> {
    let raw = std::fs::read_to_string(path).ok()?;
    let parsed: BTreeMap<String, String> = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Labels file is not an index map");
            return None;
        }
    };

    parsed
        .into_iter()
        .map(|(idx, class)| idx.parse::<usize>().ok().map(|idx| (idx, class)))
        .collect()
}

/// Whether a model artifact exists; filesystem errors count as unavailable.
pub fn check_model_availability(path: impl AsRef<Path>) -> bool {
    path.as_ref().try_exists().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("model.keras");
        std::fs::write(&file, b"weights").unwrap();

        assert!(check_model_availability(&file));
        assert!(!check_model_availability(dir.path().join("missing.keras")));
        assert!(!check_model_availability(""));
    }

    #[test]
    fn test_prefers_model_over_best_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.keras"), b"a").unwrap();
        std::fs::write(dir.path().join("best_model.keras"), b"b").unwrap();

        let info = ModelInfo::from_model_dir(dir.path()).unwrap();
        assert_eq!(info.model_path, dir.path().join("model.keras"));
        assert_eq!(info.labels_path, dir.path().join("labels.json"));
        assert_eq!(info.input_shape, vec![224, 224, 3]);
    }

    #[test]
    fn test_falls_back_to_best_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best_model.keras"), b"b").unwrap();

        let info = ModelInfo::from_model_dir(dir.path()).unwrap();
        assert_eq!(info.model_path, dir.path().join("best_model.keras"));
    }

    #[test]
    fn test_empty_dir_has_no_model() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ModelInfo::from_model_dir(dir.path()).is_none());
    }

    #[test]
    fn test_reads_classes_from_labels() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.keras"), b"a").unwrap();
        std::fs::write(
            dir.path().join("labels.json"),
            r#"{"1": "timber", "0": "bricks", "10": "glass"}"#,
        )
        .unwrap();

        let info = ModelInfo::from_model_dir(dir.path()).unwrap();
        assert_eq!(info.classes, vec!["bricks", "timber", "glass"]);
        assert_eq!(info.class_indices["glass"], 10);
    }

    #[test]
    fn test_unreadable_labels_leave_classes_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.keras"), b"a").unwrap();
        std::fs::write(dir.path().join("labels.json"), r#"["bricks", "timber"]"#).unwrap();

        let info = ModelInfo::from_model_dir(dir.path()).unwrap();
        assert!(info.classes.is_empty());
        assert!(info.class_indices.is_empty());
    }

    #[tokio::test]
    async fn test_locate_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best_model.keras"), b"b").unwrap();

        let info = ModelInfo::locate(dir.path()).await.unwrap();
        assert_eq!(info.model_path, dir.path().join("best_model.keras"));
        assert!(ModelInfo::locate(dir.path().join("missing")).await.is_none());
    }

    #[test]
    fn test_model_id_from_directory() {
        let info = ModelInfo::new("/models/abc123/model.keras", "/models/abc123/labels.json");
        assert_eq!(info.model_id().as_deref(), Some("abc123"));
    }
}
