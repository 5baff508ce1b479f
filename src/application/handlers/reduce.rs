//! ReduceHandler - principal-component projection of a roster.

use serde::Serialize;

use crate::domain::foundation::EngineError;
use crate::domain::projection::project;
use crate::domain::roster::{Entity, FeatureNames, Roster};
use crate::domain::standardize::Standardizer;

/// Command to project one roster onto its principal components.
#[derive(Debug, Clone)]
pub struct ReduceCommand {
    pub entities: Vec<Entity>,
    pub feature_names: Option<Vec<String>>,
    /// Component count; defaults to `min(2, dimensionality)` when absent.
    pub components: Option<usize>,
}

/// Projected coordinates for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityCoordinates {
    pub name: String,
    pub coordinates: Vec<f64>,
}

/// Loading vector of one component, paired with feature names.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentLoadings {
    pub component: String,
    pub loadings: Vec<f64>,
}

/// View of a completed projection.
#[derive(Debug, Clone, Serialize)]
pub struct ReduceView {
    pub entities: Vec<EntityCoordinates>,
    pub components: Vec<ComponentLoadings>,
    pub feature_names: Vec<String>,
    pub explained_variance_ratio: Vec<f64>,
    pub cumulative_variance: Vec<f64>,
    pub axis_labels: Vec<String>,
    pub feature_names_substituted: bool,
}

/// Handler for the projection operation.
#[derive(Debug, Clone, Default)]
pub struct ReduceHandler;

impl ReduceHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, cmd: ReduceCommand) -> Result<ReduceView, EngineError> {
        let roster = Roster::new(cmd.entities)?;
        let dim = roster.dimensionality();
        let features = FeatureNames::resolve(cmd.feature_names, dim);
        let k = cmd.components.unwrap_or_else(|| dim.min(2));

        let (_, standardized) = Standardizer::fit_transform(&roster.indicator_matrix())?;
        let projection = project(&standardized, k)?;

        let entities = roster
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| EntityCoordinates {
                name: name.to_string(),
                coordinates: projection.coordinates.row(i).to_vec(),
            })
            .collect();

        let components = projection
            .axis_labels
            .iter()
            .enumerate()
            .map(|(j, label)| ComponentLoadings {
                component: label.clone(),
                loadings: projection.loadings.row(j).to_vec(),
            })
            .collect();

        Ok(ReduceView {
            entities,
            components,
            feature_names: features.names,
            explained_variance_ratio: projection.explained_variance_ratio,
            cumulative_variance: projection.cumulative_variance,
            axis_labels: projection.axis_labels,
            feature_names_substituted: features.substituted,
        })
    }
}
