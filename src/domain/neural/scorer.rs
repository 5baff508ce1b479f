//! Train-and-score: neural prediction with ablation importances.
//!
//! Targets are explicitly synthetic (uniform 0-100 scores) unless real labels
//! exist upstream; the value of this path is the loss trajectory, the relative
//! predictions, and the importance profile, not absolute accuracy.

use ndarray::{Array1, Array2};
use rand::Rng;

use crate::domain::foundation::EngineError;
use crate::domain::standardize::{Standardizer, TargetScaler};
use crate::ports::ScoreModelTrainer;

use super::trainer::{TrainOptions, TrainedScoreModel};

/// Entity floor for the full training path.
pub const MIN_SCORING_ENTITIES: usize = 5;

/// Feature floor shared by both neural paths.
pub const MIN_FEATURES: usize = 2;

/// Upper bound of the synthetic target scale.
const TARGET_SCALE: f64 = 100.0;

/// Result of one train-and-score call.
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    /// Per-epoch training loss.
    pub losses: Vec<f64>,
    /// Predicted scores on the original 0-100 scale, in roster order.
    pub predictions: Vec<f64>,
    /// The synthetic targets the model was trained against.
    pub targets: Vec<f64>,
    /// `1 - |prediction - target| / 100` per entity.
    pub confidences: Vec<f64>,
    /// Ablation importance per feature, normalized so the maximum reads 1.0.
    pub feature_importance: Vec<f64>,
}

impl ScoringOutcome {
    pub fn final_loss(&self) -> f64 {
        self.losses.last().copied().unwrap_or(0.0)
    }
}

/// Trains a fresh model against synthetic targets and scores the roster.
pub fn train_and_score<R: Rng>(
    trainer: &dyn ScoreModelTrainer,
    indicators: &Array2<f64>,
    opts: &TrainOptions,
    rng: &mut R,
) -> Result<ScoringOutcome, EngineError> {
    let (n, dim) = indicators.dim();
    if n < MIN_SCORING_ENTITIES {
        return Err(EngineError::too_few_entities(
            "neural training",
            MIN_SCORING_ENTITIES,
            n,
        ));
    }
    if dim < MIN_FEATURES {
        return Err(EngineError::too_few_features("neural training", MIN_FEATURES, dim));
    }

    let targets = Array1::from_shape_fn(n, |_| rng.gen::<f64>() * TARGET_SCALE);

    let (_, x_std) = Standardizer::fit_transform(indicators)?;
    let target_scaler = TargetScaler::fit(&targets)?;
    let y_std = target_scaler.transform(&targets);

    let model = trainer.train(&x_std, &y_std, opts)?;

    let predictions_std = model.predict(&x_std);
    let predictions = target_scaler.inverse_transform(&predictions_std);

    let confidences = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| 1.0 - (p - t).abs() / TARGET_SCALE)
        .collect();

    let feature_importance = ablation_importance(&model, &x_std);

    Ok(ScoringOutcome {
        losses: model.losses().to_vec(),
        predictions: predictions.to_vec(),
        targets: targets.to_vec(),
        confidences,
        feature_importance,
    })
}

/// Single-feature ablation importance.
///
/// Zeroes one standardized feature across all rows, measures the mean
/// absolute prediction delta against the intact input, and normalizes the
/// resulting vector by its maximum so the most influential feature reads 1.0.
/// An all-zero vector (nothing moved any prediction) is returned as-is.
pub fn ablation_importance(model: &TrainedScoreModel, x_std: &Array2<f64>) -> Vec<f64> {
    let baseline = model.predict(x_std);
    let dim = x_std.ncols();

    let mut raw: Vec<f64> = (0..dim)
        .map(|j| {
            let mut ablated = x_std.clone();
            ablated.column_mut(j).fill(0.0);
            let perturbed = model.predict(&ablated);
            (&baseline - &perturbed).mapv(f64::abs).mean().unwrap_or(0.0)
        })
        .collect();

    let max = raw.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        for value in &mut raw {
            *value /= max;
        }
    }
    raw
}
