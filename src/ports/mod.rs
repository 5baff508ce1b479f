//! Port traits: seams between the analytics engine and its collaborators.

use ndarray::{Array1, Array2};

use crate::domain::foundation::EngineError;
use crate::domain::neural::{AdamTrainer, TrainOptions, TrainedScoreModel};

/// The per-request model training loop.
///
/// The engine's contract is fresh training on every call; this trait isolates
/// the loop so a cache-by-fingerprint trainer can later replace it without
/// rewriting the scoring and attribution paths.
pub trait ScoreModelTrainer: Send + Sync {
    fn train(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        opts: &TrainOptions,
    ) -> Result<TrainedScoreModel, EngineError>;
}

impl ScoreModelTrainer for AdamTrainer {
    fn train(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        opts: &TrainOptions,
    ) -> Result<TrainedScoreModel, EngineError> {
        AdamTrainer::train(self, x, y, opts)
    }
}
