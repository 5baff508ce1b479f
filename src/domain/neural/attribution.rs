//! Distribution-based per-entity attribution.
//!
//! Trains a fresh model against a synthetic target (each entity's own
//! indicator mean) and explains its predictions with a model-agnostic,
//! expectation-over-feature-coalitions procedure: features enter in random
//! order starting from the dataset background, and each feature is credited
//! with the prediction change it causes, averaged over sampled orderings.

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::foundation::EngineError;
use crate::domain::standardize::{Standardizer, TargetScaler};
use crate::ports::ScoreModelTrainer;

use super::scorer::MIN_FEATURES;
use super::trainer::TrainOptions;

/// Entity floor for the explanation path.
pub const MIN_EXPLAIN_ENTITIES: usize = 3;

/// Random feature orderings sampled per entity.
const COALITION_SAMPLES: usize = 64;

/// Result of one explanation call.
#[derive(Debug, Clone)]
pub struct AttributionOutcome {
    /// Per-entity, per-feature attribution scores in target units.
    pub per_entity: Vec<Vec<f64>>,
    /// Model prediction per entity, on the synthetic-target scale.
    pub predictions: Vec<f64>,
    /// Dataset-level mean absolute attribution per feature.
    pub mean_abs_attribution: Vec<f64>,
}

/// Trains against the per-entity indicator mean and attributes predictions
/// to features.
pub fn explain<R: Rng>(
    trainer: &dyn ScoreModelTrainer,
    indicators: &Array2<f64>,
    opts: &TrainOptions,
    rng: &mut R,
) -> Result<AttributionOutcome, EngineError> {
    let (n, dim) = indicators.dim();
    if n < MIN_EXPLAIN_ENTITIES {
        return Err(EngineError::too_few_entities(
            "attribution explanation",
            MIN_EXPLAIN_ENTITIES,
            n,
        ));
    }
    if dim < MIN_FEATURES {
        return Err(EngineError::too_few_features(
            "attribution explanation",
            MIN_FEATURES,
            dim,
        ));
    }

    // Synthetic target: the entity's own indicator mean stands in for a real
    // label.
    let targets = indicators
        .mean_axis(Axis(1))
        .ok_or_else(|| EngineError::internal("mean of empty axis"))?;

    let (_, x_std) = Standardizer::fit_transform(indicators)?;
    let target_scaler = TargetScaler::fit(&targets)?;
    let y_std = target_scaler.transform(&targets);

    let model = trainer.train(&x_std, &y_std, opts)?;

    let predictions_std = model.predict(&x_std);
    let predictions = target_scaler.inverse_transform(&predictions_std).to_vec();

    // Attribution in standardized prediction units, then rescaled to target
    // units so they are comparable with the predictions.
    let scale = target_scaler.scale();
    let mut per_entity = Vec::with_capacity(n);
    for i in 0..n {
        let row = x_std.row(i).to_owned();
        let phi = sample_attributions(&model, &row, rng);
        per_entity.push(phi.iter().map(|v| v * scale).collect::<Vec<f64>>());
    }

    let mean_abs_attribution = (0..dim)
        .map(|j| per_entity.iter().map(|phi| phi[j].abs()).sum::<f64>() / n as f64)
        .collect();

    Ok(AttributionOutcome {
        per_entity,
        predictions,
        mean_abs_attribution,
    })
}

/// Sampled expectation-over-orderings attribution for one standardized row.
///
/// The background is the dataset mean, which is the zero vector in
/// standardized space. For each sampled ordering, features are switched from
/// background to the entity's value one at a time and credited with the
/// prediction delta they cause.
fn sample_attributions<R: Rng>(
    model: &super::trainer::TrainedScoreModel,
    row: &Array1<f64>,
    rng: &mut R,
) -> Vec<f64> {
    let dim = row.len();
    let mut order: Vec<usize> = (0..dim).collect();
    let mut phi = vec![0.0; dim];

    for _ in 0..COALITION_SAMPLES {
        order.shuffle(rng);

        // One batch per ordering: background plus each cumulative coalition.
        let mut steps = Array2::zeros((dim + 1, dim));
        let mut current = Array1::zeros(dim);
        for (step, &feature) in order.iter().enumerate() {
            current[feature] = row[feature];
            steps.row_mut(step + 1).assign(&current);
        }

        let outputs = model.predict(&steps);
        for (step, &feature) in order.iter().enumerate() {
            phi[feature] += outputs[step + 1] - outputs[step];
        }
    }

    for value in &mut phi {
        *value /= COALITION_SAMPLES as f64;
    }
    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Deadline;
    use crate::domain::neural::AdamTrainer;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fast_options() -> TrainOptions {
        TrainOptions {
            epochs: 60,
            dropout: 0.0,
            seed: Some(21),
            deadline: Deadline::none(),
            ..TrainOptions::explanation()
        }
    }

    #[test]
    fn three_entities_two_features_produce_matching_shapes() {
        let x = array![[80.0, 60.0], [55.0, 90.0], [70.0, 75.0]];
        let mut rng = StdRng::seed_from_u64(8);
        let outcome = explain(&AdamTrainer, &x, &fast_options(), &mut rng).unwrap();
        assert_eq!(outcome.per_entity.len(), 3);
        assert!(outcome.per_entity.iter().all(|phi| phi.len() == 2));
        assert_eq!(outcome.mean_abs_attribution.len(), 2);
        assert_eq!(outcome.predictions.len(), 3);
    }

    #[test]
    fn attributions_sum_to_prediction_minus_background() {
        // Each sampled ordering telescopes, so the exact sum property holds
        // per entity in standardized units; after rescaling it holds in
        // target units against the rescaled background delta.
        let x = array![[80.0, 60.0, 70.0], [55.0, 90.0, 65.0], [70.0, 75.0, 85.0], [60.0, 62.0, 64.0]];
        let mut rng = StdRng::seed_from_u64(9);
        let opts = fast_options();
        let outcome = explain(&AdamTrainer, &x, &opts, &mut rng).unwrap();

        // Recompute the model deterministically to obtain the background
        // prediction in target units.
        let (_, x_std) = Standardizer::fit_transform(&x).unwrap();
        let targets = x.mean_axis(Axis(1)).unwrap();
        let scaler = TargetScaler::fit(&targets).unwrap();
        let model = AdamTrainer
            .train(&x_std, &scaler.transform(&targets), &opts)
            .unwrap();
        let background = scaler
            .inverse_transform(&model.predict(&Array2::zeros((1, 3))))[0];

        for (phi, &prediction) in outcome.per_entity.iter().zip(outcome.predictions.iter()) {
            let sum: f64 = phi.iter().sum();
            assert!(
                (sum - (prediction - background)).abs() < 1e-6,
                "sum {} vs delta {}",
                sum,
                prediction - background
            );
        }
    }

    #[test]
    fn finite_attributions_everywhere() {
        let x = array![[1.0, 2.0], [3.0, 1.0], [2.0, 4.0], [5.0, 2.0]];
        let mut rng = StdRng::seed_from_u64(10);
        let outcome = explain(&AdamTrainer, &x, &fast_options(), &mut rng).unwrap();
        for phi in &outcome.per_entity {
            assert!(phi.iter().all(|v| v.is_finite()));
        }
        assert!(outcome.mean_abs_attribution.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn rejects_two_entities() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let err = explain(&AdamTrainer, &x, &fast_options(), &mut rng).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn rejects_single_feature() {
        let x = array![[1.0], [2.0], [3.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let err = explain(&AdamTrainer, &x, &fast_options(), &mut rng).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_DATA");
    }
}
