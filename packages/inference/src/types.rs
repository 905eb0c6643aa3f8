use crate::labels::display_name;
use serde::{Deserialize, Serialize};

/// Number of ranked predictions kept in a result
pub const TOP_N: usize = 5;

/// One ranked output of the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Internal class key reported by the model
    #[serde(rename = "class")]
    pub class: String,
    /// Human readable material name
    #[serde(rename = "className")]
    pub class_name: String,
    pub confidence: f64,
}

impl Prediction {
    /// Build a prediction, resolving the display name from the material table
    pub fn new(class: impl Into<String>, confidence: f64) -> Self {
        let class = class.into();
        let class_name = display_name(&class).to_string();
        Self {
            class,
            class_name,
            confidence,
        }
    }
}

/// Normalized result of one inference call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Top predictions, highest confidence first
    pub predictions: Vec<Prediction>,
    pub top_prediction: Prediction,
    /// Which model produced the result
    pub model_used: String,
    /// True when the result is synthetic
    pub is_simulation: bool,
}

impl PredictionResult {
    /// Rank predictions by confidence and keep the top [`TOP_N`].
    ///
    /// The sort is stable, so predictions with equal confidence keep their
    /// input order. Returns `None` for an empty input.
    pub fn from_predictions(
        mut predictions: Vec<Prediction>,
        model_used: impl Into<String>,
        is_simulation: bool,
    ) -> Option<Self> {
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        predictions.truncate(TOP_N);
        let top_prediction = predictions.first()?.clone();

        Some(Self {
            predictions,
            top_prediction,
            model_used: model_used.into(),
            is_simulation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_sorts_and_truncates() {
        let predictions = vec![
            Prediction::new("glass", 0.05),
            Prediction::new("bricks", 0.40),
            Prediction::new("timber", 0.10),
            Prediction::new("steel", 0.20),
            Prediction::new("concrete", 0.15),
            Prediction::new("aggregate", 0.08),
            Prediction::new("plasterboard", 0.02),
        ];

        let result = PredictionResult::from_predictions(predictions, "test", false).unwrap();
        assert_eq!(result.predictions.len(), TOP_N);
        assert_eq!(result.top_prediction, result.predictions[0]);
        assert_eq!(result.top_prediction.class, "bricks");
        assert!(
            result
                .predictions
                .windows(2)
                .all(|w| w[0].confidence >= w[1].confidence)
        );
    }

    #[test]
    fn test_ranking_is_stable_for_ties() {
        let predictions = vec![
            Prediction::new("first", 0.5),
            Prediction::new("second", 0.5),
            Prediction::new("third", 0.5),
        ];

        let result = PredictionResult::from_predictions(predictions, "test", false).unwrap();
        let order: Vec<&str> = result.predictions.iter().map(|p| p.class.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_predictions() {
        assert!(PredictionResult::from_predictions(Vec::new(), "test", false).is_none());
    }

    #[test]
    fn test_wire_format() {
        let result = PredictionResult::from_predictions(
            vec![Prediction::new("bricks", 0.9)],
            "model.keras",
            false,
        )
        .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["topPrediction"]["class"], "bricks");
        assert_eq!(json["topPrediction"]["className"], "Bricks (common)");
        assert_eq!(json["modelUsed"], "model.keras");
        assert_eq!(json["isSimulation"], false);
    }
}
