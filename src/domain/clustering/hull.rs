//! Convex boundary extraction for 2-D clusters.
//!
//! Clusters with three or more points get their convex hull (Andrew's
//! monotone chain) and shoelace area. One- and two-point clusters degenerate
//! to the points themselves with area 0. Collinear point sets, where a proper
//! hull does not exist, fall back to the axis-aligned bounding rectangle;
//! that degeneracy is recovered locally and never surfaced as an error.

/// A 2-D point in clustering space.
pub type Point = [f64; 2];

/// The boundary of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBoundary {
    pub cluster_id: usize,
    /// Hull vertices in order, the degenerate points themselves, or the four
    /// corners of the fallback rectangle.
    pub points: Vec<Point>,
    pub area: f64,
}

/// Computes the boundary of a cluster's points.
pub fn cluster_boundary(cluster_id: usize, points: &[Point]) -> ClusterBoundary {
    if points.len() < 3 {
        return ClusterBoundary {
            cluster_id,
            points: points.to_vec(),
            area: 0.0,
        };
    }

    let hull = convex_hull(points);
    if hull.len() >= 3 {
        let area = shoelace_area(&hull);
        ClusterBoundary {
            cluster_id,
            points: hull,
            area,
        }
    } else {
        bounding_rectangle(cluster_id, points)
    }
}

/// Andrew's monotone chain. Returns hull vertices in counter-clockwise order;
/// collinear inputs collapse to fewer than 3 vertices.
fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points.to_vec();
    sorted.sort_by(|a, b| {
        a[0].partial_cmp(&b[0])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a[1].partial_cmp(&b[1]).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup_by(|a, b| a[0] == b[0] && a[1] == b[1]);

    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: &Point, a: &Point, b: &Point| -> f64 {
        (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
    };

    let mut lower: Vec<Point> = Vec::new();
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn shoelace_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let [x1, y1] = vertices[i];
        let [x2, y2] = vertices[(i + 1) % n];
        twice_area += x1 * y2 - x2 * y1;
    }
    twice_area.abs() / 2.0
}

fn bounding_rectangle(cluster_id: usize, points: &[Point]) -> ClusterBoundary {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &[x, y] in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    ClusterBoundary {
        cluster_id,
        points: vec![
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
        ],
        area: (max_x - min_x) * (max_y - min_y),
    }
}
