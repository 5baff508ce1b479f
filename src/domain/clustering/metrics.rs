//! Cluster-quality metrics, computed defensively.
//!
//! Both metrics return `None` instead of failing when the partition is too
//! degenerate for the formula to mean anything.

use std::collections::HashSet;

use super::hull::Point;

fn distance(a: &Point, b: &Point) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

fn distinct_labels(labels: &[usize]) -> HashSet<usize> {
    labels.iter().copied().collect()
}

/// Mean silhouette coefficient over all points.
///
/// Requires at least two distinct clusters and more points than clusters;
/// otherwise the coefficient is undefined and `None` is returned. Points
/// alone in their cluster contribute 0.
pub fn silhouette_score(points: &[Point], labels: &[usize]) -> Option<f64> {
    let clusters = distinct_labels(labels);
    if clusters.len() < 2 || points.len() <= clusters.len() {
        return None;
    }

    let n = points.len();
    let mut total = 0.0;
    for i in 0..n {
        let own = labels[i];
        let own_size = labels.iter().filter(|&&l| l == own).count();
        if own_size == 1 {
            continue; // singleton contributes 0
        }

        let mut intra = 0.0;
        for j in 0..n {
            if j != i && labels[j] == own {
                intra += distance(&points[i], &points[j]);
            }
        }
        let a = intra / (own_size - 1) as f64;

        let mut b = f64::INFINITY;
        for &other in &clusters {
            if other == own {
                continue;
            }
            let members: Vec<usize> = (0..n).filter(|&j| labels[j] == other).collect();
            let mean: f64 = members
                .iter()
                .map(|&j| distance(&points[i], &points[j]))
                .sum::<f64>()
                / members.len() as f64;
            b = b.min(mean);
        }

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Some(total / n as f64)
}

/// Calinski-Harabasz variance-ratio index.
///
/// Requires at least two distinct clusters, fewer clusters than points, and
/// nonzero within-cluster scatter (the ratio diverges on perfectly tight
/// clusters); otherwise `None`.
pub fn calinski_harabasz_score(points: &[Point], labels: &[usize]) -> Option<f64> {
    let clusters = distinct_labels(labels);
    let k = clusters.len();
    let n = points.len();
    if k < 2 || n <= k {
        return None;
    }

    let grand = centroid(points, &(0..n).collect::<Vec<_>>());

    let mut between = 0.0;
    let mut within = 0.0;
    for &label in &clusters {
        let members: Vec<usize> = (0..n).filter(|&j| labels[j] == label).collect();
        let center = centroid(points, &members);
        between += members.len() as f64 * distance(&center, &grand).powi(2);
        for &j in &members {
            within += distance(&points[j], &center).powi(2);
        }
    }

    if within <= f64::EPSILON {
        return None;
    }

    Some((between / (k - 1) as f64) / (within / (n - k) as f64))
}

fn centroid(points: &[Point], members: &[usize]) -> Point {
    let mut x = 0.0;
    let mut y = 0.0;
    for &j in members {
        x += points[j][0];
        y += points[j][1];
    }
    let m = members.len() as f64;
    [x / m, y / m]
}
