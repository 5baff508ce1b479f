//! TrainScoreHandler - trains a scoring model over a roster and returns
//! predictions, confidences, and feature importances.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::domain::foundation::EngineError;
use crate::domain::neural::{train_and_score, TrainOptions};
use crate::domain::roster::{Entity, FeatureNames, Roster};
use crate::ports::ScoreModelTrainer;

/// Command to train and score one roster.
#[derive(Debug, Clone)]
pub struct TrainScoreCommand {
    pub entities: Vec<Entity>,
    pub feature_names: Option<Vec<String>>,
    pub seed: Option<u64>,
}

/// Score and confidence for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityScore {
    pub name: String,
    pub prediction: f64,
    pub target: f64,
    pub confidence: f64,
}

/// Importance of one feature under single-feature ablation.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// View of a completed training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainScoreView {
    pub losses: Vec<f64>,
    pub final_loss: f64,
    pub scores: Vec<EntityScore>,
    pub feature_importance: Vec<FeatureImportance>,
    pub feature_names_substituted: bool,
}

/// Handler for the train-and-score operation.
pub struct TrainScoreHandler {
    trainer: Arc<dyn ScoreModelTrainer>,
    config: EngineConfig,
}

impl TrainScoreHandler {
    pub fn new(trainer: Arc<dyn ScoreModelTrainer>, config: EngineConfig) -> Self {
        Self { trainer, config }
    }

    pub fn handle(&self, cmd: TrainScoreCommand) -> Result<TrainScoreView, EngineError> {
        let roster = Roster::new(cmd.entities)?;
        let features = FeatureNames::resolve(cmd.feature_names, roster.dimensionality());

        let opts = TrainOptions {
            epochs: self.config.train_epochs,
            ..TrainOptions::scoring()
        }
        .with_seed(cmd.seed)
        .with_deadline(self.config.deadline());

        let mut rng = match cmd.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let outcome = train_and_score(
            self.trainer.as_ref(),
            &roster.indicator_matrix(),
            &opts,
            &mut rng,
        )?;

        let scores = roster
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| EntityScore {
                name: name.to_string(),
                prediction: outcome.predictions[i],
                target: outcome.targets[i],
                confidence: outcome.confidences[i],
            })
            .collect();

        let feature_importance = features
            .names
            .iter()
            .zip(outcome.feature_importance.iter())
            .map(|(feature, &importance)| FeatureImportance {
                feature: feature.clone(),
                importance,
            })
            .collect();

        Ok(TrainScoreView {
            final_loss: outcome.final_loss(),
            losses: outcome.losses,
            scores,
            feature_importance,
            feature_names_substituted: features.substituted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::neural::AdamTrainer;

    fn handler() -> TrainScoreHandler {
        let config = EngineConfig {
            train_epochs: 40,
            ..Default::default()
        };
        TrainScoreHandler::new(Arc::new(AdamTrainer), config)
    }

    fn roster_of(n: usize, dim: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| {
                Entity::new(
                    format!("ip-{}", i),
                    "heritage",
                    (0..dim).map(|j| (i * dim + j) as f64 * 1.3 + 2.0).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn scores_every_entity_in_roster_order() {
        let handler = handler();
        let view = handler
            .handle(TrainScoreCommand {
                entities: roster_of(6, 3),
                feature_names: None,
                seed: Some(11),
            })
            .unwrap();

        assert_eq!(view.scores.len(), 6);
        assert_eq!(view.scores[0].name, "ip-0");
        assert_eq!(view.losses.len(), 40);
        assert!(view.scores.iter().all(|s| s.prediction.is_finite()));
    }

    #[test]
    fn pairs_importances_with_supplied_feature_names() {
        let handler = handler();
        let view = handler
            .handle(TrainScoreCommand {
                entities: roster_of(5, 2),
                feature_names: Some(vec!["heritage".to_string(), "reach".to_string()]),
                seed: Some(5),
            })
            .unwrap();

        assert!(!view.feature_names_substituted);
        assert_eq!(view.feature_importance.len(), 2);
        assert_eq!(view.feature_importance[0].feature, "heritage");
    }

    #[test]
    fn substitutes_placeholder_names_on_length_mismatch() {
        let handler = handler();
        let view = handler
            .handle(TrainScoreCommand {
                entities: roster_of(5, 3),
                feature_names: Some(vec!["only-one".to_string()]),
                seed: Some(5),
            })
            .unwrap();

        assert!(view.feature_names_substituted);
        assert_eq!(view.feature_importance[2].feature, "indicator 3");
    }

    #[test]
    fn same_seed_reproduces_scores() {
        let handler = handler();
        let cmd = TrainScoreCommand {
            entities: roster_of(6, 3),
            feature_names: None,
            seed: Some(99),
        };
        let a = handler.handle(cmd.clone()).unwrap();
        let b = handler.handle(cmd).unwrap();
        for (x, y) in a.scores.iter().zip(b.scores.iter()) {
            assert_eq!(x.prediction, y.prediction);
        }
    }

    #[test]
    fn rejects_undersized_roster() {
        let handler = handler();
        let err = handler
            .handle(TrainScoreCommand {
                entities: roster_of(4, 3),
                feature_names: None,
                seed: Some(1),
            })
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_DATA");
        assert!(err.is_client_error());
    }

    #[test]
    fn rejects_ragged_indicator_vectors() {
        let handler = handler();
        let mut entities = roster_of(6, 3);
        entities[2].indicators.pop();
        let err = handler
            .handle(TrainScoreCommand {
                entities,
                feature_names: None,
                seed: Some(1),
            })
            .unwrap_err();
        assert_eq!(err.code(), "DIMENSION_MISMATCH");
    }
}
