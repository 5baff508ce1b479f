//! ClusterHandler - k-means partitioning of a roster with boundaries and
//! quality metrics.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::domain::clustering::{cluster, ClusterParams};
use crate::domain::foundation::EngineError;
use crate::domain::roster::{Entity, FeatureNames, Roster};
use crate::domain::standardize::Standardizer;

/// Command to cluster one roster.
#[derive(Debug, Clone)]
pub struct ClusterCommand {
    pub entities: Vec<Entity>,
    pub feature_names: Option<Vec<String>>,
    pub cluster_count: usize,
    pub use_projection: bool,
    pub seed: Option<u64>,
}

/// Cluster membership for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityCluster {
    pub name: String,
    pub cluster_id: usize,
    pub x: f64,
    pub y: f64,
    pub distance_to_centroid: f64,
}

/// Convex boundary of one cluster in the 2-D clustering space.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterBoundaryView {
    pub cluster_id: usize,
    pub points: Vec<[f64; 2]>,
    pub area: f64,
}

/// View of a completed clustering call.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterView {
    pub assignments: Vec<EntityCluster>,
    pub centroids: Vec<[f64; 2]>,
    pub boundaries: Vec<ClusterBoundaryView>,
    pub silhouette: Option<f64>,
    pub calinski_harabasz: Option<f64>,
    pub projected: bool,
    pub variance_explained: Option<Vec<f64>>,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub feature_names_substituted: bool,
}

/// Handler for the clustering operation.
pub struct ClusterHandler {
    config: EngineConfig,
}

impl ClusterHandler {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn handle(&self, cmd: ClusterCommand) -> Result<ClusterView, EngineError> {
        let roster = Roster::new(cmd.entities)?;
        let features = FeatureNames::resolve(cmd.feature_names, roster.dimensionality());

        let (_, standardized) = Standardizer::fit_transform(&roster.indicator_matrix())?;

        let params = ClusterParams {
            cluster_count: cmd.cluster_count,
            use_projection: cmd.use_projection,
            restarts: self.config.kmeans_restarts,
            deadline: self.config.deadline(),
        };

        let mut rng = match cmd.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let analysis = cluster(&standardized, &params, &mut rng)?;

        let assignments = roster
            .names()
            .iter()
            .zip(analysis.assignments.iter())
            .map(|(name, a)| EntityCluster {
                name: name.to_string(),
                cluster_id: a.cluster_id,
                x: a.coordinates[0],
                y: a.coordinates[1],
                distance_to_centroid: a.distance_to_centroid,
            })
            .collect();

        let boundaries = analysis
            .boundaries
            .iter()
            .map(|b| ClusterBoundaryView {
                cluster_id: b.cluster_id,
                points: b.points.clone(),
                area: b.area,
            })
            .collect();

        Ok(ClusterView {
            assignments,
            centroids: analysis.centroids,
            boundaries,
            silhouette: analysis.silhouette,
            calinski_harabasz: analysis.calinski_harabasz,
            projected: analysis.space.projected,
            variance_explained: analysis.space.variance_explained,
            x_axis_label: analysis.space.x_axis_label,
            y_axis_label: analysis.space.y_axis_label,
            feature_names_substituted: features.substituted,
        })
    }
}
