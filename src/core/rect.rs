//! Minimum-area oriented bounding rectangle.
//!
//! The minimum-area enclosing rectangle of a point set has one side
//! collinear with an edge of the convex hull, so it is enough to try every
//! hull edge direction ("rotating calipers") and keep the smallest area.
//!
//! ```text
//!        ┌──────────────────┐
//!       ╱  ·   ·      ·    ╱     long side
//!      ╱ ·    hull   ·    ╱
//!     └──────────────────┘
//!           short side
//! ```

use super::hull::convex_hull;
use super::point::Point2D;

/// Rectangles below this area (m²) are treated as degenerate.
pub const MIN_RECT_AREA: f64 = 1e-10;

/// An oriented rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    /// Corners in counter-clockwise order.
    pub corners: [Point2D; 4],
    /// Area in square units of the input plane.
    pub area: f64,
}

impl OrientedRect {
    /// Lengths of the four sides, `corners[i] → corners[i + 1]`.
    pub fn side_lengths(&self) -> [f64; 4] {
        let c = &self.corners;
        [
            c[0].distance(c[1]),
            c[1].distance(c[2]),
            c[2].distance(c[3]),
            c[3].distance(c[0]),
        ]
    }
}

/// Compute the minimum-area rectangle enclosing `points`.
///
/// Returns `None` when the points span no area (empty, coincident or
/// collinear input).
pub fn min_area_rect(points: &[Point2D]) -> Option<OrientedRect> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<OrientedRect> = None;

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let Some(u) = (b - a).normalized() else {
            continue;
        };
        let v = u.perp();

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for &p in &hull {
            let d = p - a;
            let pu = d.dot(u);
            let pv = d.dot(v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.is_none_or(|r| area < r.area) {
            let at = |su: f64, sv: f64| a + u * su + v * sv;
            best = Some(OrientedRect {
                corners: [
                    at(min_u, min_v),
                    at(max_u, min_v),
                    at(max_u, max_v),
                    at(min_u, max_v),
                ],
                area,
            });
        }
    }

    best.filter(|r| r.area > MIN_RECT_AREA)
}
