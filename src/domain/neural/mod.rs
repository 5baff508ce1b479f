//! Neural scoring: per-request training, prediction, and explanation.

mod attribution;
mod network;
mod scorer;
mod trainer;

pub use attribution::{explain, AttributionOutcome, MIN_EXPLAIN_ENTITIES};
pub use network::{ScoreNet, DROPOUT_P};
pub use scorer::{
    ablation_importance, train_and_score, ScoringOutcome, MIN_FEATURES, MIN_SCORING_ENTITIES,
};
pub use trainer::{AdamTrainer, TrainOptions, TrainedScoreModel, EXPLAIN_EPOCHS, TRAIN_EPOCHS};
