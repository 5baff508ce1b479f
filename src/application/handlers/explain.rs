//! ExplainHandler - per-entity feature attribution for roster predictions.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::domain::foundation::EngineError;
use crate::domain::neural::{explain, TrainOptions};
use crate::domain::roster::{Entity, FeatureNames, Roster};
use crate::ports::ScoreModelTrainer;

/// Command to explain predictions over one roster.
#[derive(Debug, Clone)]
pub struct ExplainCommand {
    pub entities: Vec<Entity>,
    pub feature_names: Option<Vec<String>>,
    pub seed: Option<u64>,
}

/// Attribution profile for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityAttribution {
    pub name: String,
    pub prediction: f64,
    /// Per-feature attribution, aligned with the view's feature order.
    pub attributions: Vec<f64>,
}

/// Dataset-level attribution summary for one feature.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureAttributionSummary {
    pub feature: String,
    pub mean_abs_attribution: f64,
}

/// View of a completed explanation run.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainView {
    pub entities: Vec<EntityAttribution>,
    pub features: Vec<FeatureAttributionSummary>,
    pub feature_names_substituted: bool,
}

/// Handler for the attribution-explanation operation.
pub struct ExplainHandler {
    trainer: Arc<dyn ScoreModelTrainer>,
    config: EngineConfig,
}

impl ExplainHandler {
    pub fn new(trainer: Arc<dyn ScoreModelTrainer>, config: EngineConfig) -> Self {
        Self { trainer, config }
    }

    pub fn handle(&self, cmd: ExplainCommand) -> Result<ExplainView, EngineError> {
        let roster = Roster::new(cmd.entities)?;
        let features = FeatureNames::resolve(cmd.feature_names, roster.dimensionality());

        let opts = TrainOptions {
            epochs: self.config.explain_epochs,
            ..TrainOptions::explanation()
        }
        .with_seed(cmd.seed)
        .with_deadline(self.config.deadline());

        let mut rng = match cmd.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let outcome = explain(
            self.trainer.as_ref(),
            &roster.indicator_matrix(),
            &opts,
            &mut rng,
        )?;

        let entities = roster
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| EntityAttribution {
                name: name.to_string(),
                prediction: outcome.predictions[i],
                attributions: outcome.per_entity[i].clone(),
            })
            .collect();

        let features_summary = features
            .names
            .iter()
            .zip(outcome.mean_abs_attribution.iter())
            .map(|(feature, &mean_abs)| FeatureAttributionSummary {
                feature: feature.clone(),
                mean_abs_attribution: mean_abs,
            })
            .collect();

        Ok(ExplainView {
            entities,
            features: features_summary,
            feature_names_substituted: features.substituted,
        })
    }
}
