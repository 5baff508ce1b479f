//! Partition clustering with boundary extraction.
//!
//! Standardized indicators are (by default) projected to two principal
//! components, partitioned by k-means from multiple random initializations,
//! and each cluster gets a convex boundary and quality metrics.

mod hull;
mod metrics;

pub use hull::{cluster_boundary, ClusterBoundary, Point};
pub use metrics::{calinski_harabasz_score, silhouette_score};

use ndarray::Array2;
use rand::Rng;

use super::foundation::{Deadline, EngineError};
use super::projection::project;

/// Default number of k-means restarts; the lowest-inertia run wins.
pub const DEFAULT_RESTARTS: usize = 10;

const MAX_KMEANS_ITERATIONS: usize = 100;

/// Per-entity clustering result. `cluster_id` is stable only within one call;
/// re-running may permute labels.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    pub cluster_id: usize,
    pub coordinates: Point,
    pub distance_to_centroid: f64,
}

/// How the 2-D clustering space was obtained.
#[derive(Debug, Clone)]
pub struct ClusteringSpace {
    pub projected: bool,
    /// Explained-variance ratios of the two projection axes, when projected.
    pub variance_explained: Option<Vec<f64>>,
    pub x_axis_label: String,
    pub y_axis_label: String,
}

/// Full output of one clustering call.
#[derive(Debug, Clone)]
pub struct ClusterAnalysis {
    pub assignments: Vec<ClusterAssignment>,
    pub centroids: Vec<Point>,
    pub boundaries: Vec<ClusterBoundary>,
    pub silhouette: Option<f64>,
    pub calinski_harabasz: Option<f64>,
    pub space: ClusteringSpace,
}

/// Parameters for one clustering call.
#[derive(Debug, Clone)]
pub struct ClusterParams {
    pub cluster_count: usize,
    /// Project to two principal components first (the default when the
    /// native dimensionality exceeds 2).
    pub use_projection: bool,
    pub restarts: usize,
    pub deadline: Deadline,
}

impl ClusterParams {
    pub fn new(cluster_count: usize) -> Self {
        Self {
            cluster_count,
            use_projection: true,
            restarts: DEFAULT_RESTARTS,
            deadline: Deadline::none(),
        }
    }
}

/// Clusters a standardized indicator matrix.
///
/// The clustering space is 2-D: the top two principal components when
/// projection is requested and the dimensionality exceeds 2, otherwise the
/// first two standardized columns (a single-indicator roster clusters along
/// one axis with the second coordinate fixed at 0).
pub fn cluster<R: Rng>(
    standardized: &Array2<f64>,
    params: &ClusterParams,
    rng: &mut R,
) -> Result<ClusterAnalysis, EngineError> {
    let n = standardized.nrows();
    let dim = standardized.ncols();
    let k = params.cluster_count;

    if k < 2 {
        return Err(EngineError::dimension(format!(
            "cluster count must be at least 2, got {}",
            k
        )));
    }
    if k > n {
        return Err(EngineError::dimension(format!(
            "cluster count {} exceeds entity count {}",
            k, n
        )));
    }

    let (points, space) = clustering_space(standardized, params.use_projection, dim)?;

    let mut best: Option<(Vec<usize>, Vec<Point>, f64)> = None;
    for _ in 0..params.restarts.max(1) {
        params.deadline.check()?;
        let (labels, centroids, inertia) = kmeans_once(&points, k, &params.deadline, rng)?;
        if best.as_ref().map_or(true, |(_, _, b)| inertia < *b) {
            best = Some((labels, centroids, inertia));
        }
    }
    let (labels, centroids, _) = best.ok_or_else(|| EngineError::internal("no k-means run completed"))?;

    let assignments = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let c = centroids[label];
            let p = points[i];
            ClusterAssignment {
                cluster_id: label,
                coordinates: p,
                distance_to_centroid: ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2)).sqrt(),
            }
        })
        .collect();

    let boundaries = (0..k)
        .map(|cluster_id| {
            params.deadline.check()?;
            let members: Vec<Point> = labels
                .iter()
                .zip(points.iter())
                .filter(|(&l, _)| l == cluster_id)
                .map(|(_, &p)| p)
                .collect();
            Ok(cluster_boundary(cluster_id, &members))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let silhouette = silhouette_score(&points, &labels);
    let calinski_harabasz = calinski_harabasz_score(&points, &labels);

    Ok(ClusterAnalysis {
        assignments,
        centroids,
        boundaries,
        silhouette,
        calinski_harabasz,
        space,
    })
}

fn clustering_space(
    standardized: &Array2<f64>,
    use_projection: bool,
    dim: usize,
) -> Result<(Vec<Point>, ClusteringSpace), EngineError> {
    if use_projection && dim > 2 {
        let projection = project(standardized, 2)?;
        let points = (0..projection.coordinates.nrows())
            .map(|i| [projection.coordinates[[i, 0]], projection.coordinates[[i, 1]]])
            .collect();
        return Ok((
            points,
            ClusteringSpace {
                projected: true,
                variance_explained: Some(projection.explained_variance_ratio.clone()),
                x_axis_label: projection.axis_labels[0].clone(),
                y_axis_label: projection.axis_labels[1].clone(),
            },
        ));
    }

    let points = (0..standardized.nrows())
        .map(|i| {
            let x = standardized[[i, 0]];
            let y = if dim >= 2 { standardized[[i, 1]] } else { 0.0 };
            [x, y]
        })
        .collect();
    Ok((
        points,
        ClusteringSpace {
            projected: false,
            variance_explained: None,
            x_axis_label: "dimension 1".to_string(),
            y_axis_label: "dimension 2".to_string(),
        },
    ))
}

/// One k-means run: k-means++ seeding, then alternating assignment and
/// centroid refinement until stable.
fn kmeans_once<R: Rng>(
    points: &[Point],
    k: usize,
    deadline: &Deadline,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<Point>, f64), EngineError> {
    let n = points.len();
    let mut centroids = seed_centroids(points, k, rng);
    let mut labels = vec![0usize; n];

    for _ in 0..MAX_KMEANS_ITERATIONS {
        deadline.check()?;

        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        let snapshot = centroids.clone();
        for (cluster_id, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Point> = points
                .iter()
                .zip(labels.iter())
                .filter(|(_, &l)| l == cluster_id)
                .map(|(p, _)| p)
                .collect();
            if members.is_empty() {
                // Re-seed an emptied cluster at the point farthest from its
                // currently assigned centroid.
                if let Some((idx, _)) = points.iter().enumerate().max_by(|(i, a), (j, b)| {
                    squared_distance(a, &snapshot[labels[*i]])
                        .partial_cmp(&squared_distance(b, &snapshot[labels[*j]]))
                        .unwrap_or(std::cmp::Ordering::Equal)
                }) {
                    *centroid = points[idx];
                    changed = true;
                }
                continue;
            }
            let m = members.len() as f64;
            *centroid = [
                members.iter().map(|p| p[0]).sum::<f64>() / m,
                members.iter().map(|p| p[1]).sum::<f64>() / m,
            ];
        }

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(labels.iter())
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum();

    Ok((labels, centroids, inertia))
}

/// k-means++ style seeding: first centroid uniform, the rest drawn with
/// probability proportional to squared distance from the nearest chosen one.
fn seed_centroids<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)]);

    while centroids.len() < k {
        let distances: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();
        if total <= f64::EPSILON {
            // All remaining points coincide with a centroid.
            centroids.push(points[rng.gen_range(0..n)]);
            continue;
        }
        let mut draw = rng.gen::<f64>() * total;
        let mut chosen = n - 1;
        for (i, &d) in distances.iter().enumerate() {
            draw -= d;
            if draw <= 0.0 {
                chosen = i;
                break;
            }
        }
        centroids.push(points[chosen]);
    }
    centroids
}

fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}
