//! Convex hull (Andrew's monotone chain).

use super::point::Point2D;

/// Cross-product tolerance below which three points count as collinear.
const COLLINEAR_EPS: f64 = 1e-12;

/// Compute the convex hull of a point set.
///
/// Returns hull vertices in counter-clockwise order without repeating the
/// first vertex. Collinear points on hull edges are dropped. The result has
/// fewer than 3 vertices when the input is empty, a single point, or
/// collinear.
///
/// # Example
/// ```
/// use ousposer::core::{Point2D, hull::convex_hull};
///
/// let hull = convex_hull(&[
///     Point2D::new(0.0, 0.0),
///     Point2D::new(2.0, 0.0),
///     Point2D::new(1.0, 0.5),
///     Point2D::new(2.0, 1.0),
///     Point2D::new(0.0, 1.0),
/// ]);
/// assert_eq!(hull.len(), 4);
/// ```
pub fn convex_hull(points: &[Point2D]) -> Vec<Point2D> {
    let mut pts: Vec<Point2D> = points.to_vec();
    pts.sort_unstable_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: Point2D, a: Point2D, b: Point2D| (a - o).cross(b - o);

    let mut lower: Vec<Point2D> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2
            && turn(lower[lower.len() - 2], lower[lower.len() - 1], p) <= COLLINEAR_EPS
        {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point2D> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2
            && turn(upper[upper.len() - 2], upper[upper.len() - 1], p) <= COLLINEAR_EPS
        {
            upper.pop();
        }
        upper.push(p);
    }

    // Last point of each chain is the first of the other
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Signed area of a simple polygon (positive for counter-clockwise).
pub fn polygon_area(vertices: &[Point2D]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        sum += a.cross(b);
    }
    sum * 0.5
}
