//! Synthetic predictions for when no real model can be used

use crate::labels::MATERIAL_CLASSES;
use crate::types::{Prediction, PredictionResult};
use rand::Rng;

pub const SIMULATION_MODEL_NAME: &str = "EcoBuild Simulation";

const HIGH_BAND: (f64, f64) = (0.70, 0.95);
const LOW_BAND: (f64, f64) = (0.05, 0.35);

/// Produce a plausible random result over the material table.
pub fn simulate_prediction() -> PredictionResult {
    simulate_with_rng(&mut rand::rng())
}

/// Same as [`simulate_prediction`] with a caller supplied RNG.
///
/// The kept top predictions are rescaled so the returned confidences sum to 1.
pub fn simulate_with_rng<R: Rng + ?Sized>(rng: &mut R) -> PredictionResult {
    let distribution = simulated_distribution(rng);

    // The material table is never empty.
    let mut result =
        PredictionResult::from_predictions(distribution, SIMULATION_MODEL_NAME, true)
            .unwrap_or_else(|| unreachable!("material table is empty"));

    normalize(&mut result.predictions);
    result.top_prediction = result.predictions[0].clone();
    result
}

/// Random confidences for every class in the material table, summing to 1.
pub fn simulated_distribution<R: Rng + ?Sized>(rng: &mut R) -> Vec<Prediction> {
    let chosen = rng.random_range(0..MATERIAL_CLASSES.len());

    let mut predictions: Vec<Prediction> = MATERIAL_CLASSES
        .iter()
        .enumerate()
        .map(|(idx, (key, _))| {
            let (low, high) = if idx == chosen { HIGH_BAND } else { LOW_BAND };
            Prediction::new(*key, rng.random_range(low..high))
        })
        .collect();

    normalize(&mut predictions);
    tracing::debug!(class = MATERIAL_CLASSES[chosen].0, "Generated simulated prediction");
    predictions
}

fn normalize(predictions: &mut [Prediction]) {
    let total: f64 = predictions.iter().map(|p| p.confidence).sum();
    for prediction in predictions.iter_mut() {
        prediction.confidence /= total;
    }
}
