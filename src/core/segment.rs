//! Distances between planar segments, polylines and polygons.

use super::math::compute_centroid;
use super::point::Point2D;

/// Distance from a point to the segment `a → b`.
#[inline]
pub fn point_segment_distance(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f64::EPSILON {
        // Degenerate segment (zero length)
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// True if segments `p1 → p2` and `q1 → q2` intersect (touching included).
pub fn segments_intersect(p1: Point2D, p2: Point2D, q1: Point2D, q2: Point2D) -> bool {
    let d1 = (q2 - q1).cross(p1 - q1);
    let d2 = (q2 - q1).cross(p2 - q1);
    let d3 = (p2 - p1).cross(q1 - p1);
    let d4 = (p2 - p1).cross(q2 - p1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear / touching cases
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

#[inline]
fn on_segment(a: Point2D, b: Point2D, p: Point2D) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Minimum distance between two segments (zero if they intersect).
pub fn segment_segment_distance(p1: Point2D, p2: Point2D, q1: Point2D, q2: Point2D) -> f64 {
    if segments_intersect(p1, p2, q1, q2) {
        return 0.0;
    }
    point_segment_distance(p1, q1, q2)
        .min(point_segment_distance(p2, q1, q2))
        .min(point_segment_distance(q1, p1, p2))
        .min(point_segment_distance(q2, p1, p2))
}

/// Even-odd point-in-ring test. The ring may or may not repeat its first vertex.
pub fn point_in_ring(p: Point2D, ring: &[Point2D]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Signed area of a ring and its first moment scaled by 6 (shoelace terms).
fn ring_moments(ring: &[Point2D]) -> (f64, Point2D) {
    let mut area2 = 0.0;
    let mut moment = Point2D::ZERO;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
        let cross = a.cross(b);
        area2 += cross;
        moment = moment + (a + b) * cross;
    }
    (area2 * 0.5, moment)
}

/// Role of one vertex chain inside a [`PlanarShape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    /// Polyline; contributes no interior.
    Open,
    /// Polygon exterior ring.
    Exterior,
    /// Hole of the closest preceding exterior ring.
    Hole,
}

impl PartKind {
    /// True for rings, whose last vertex connects back to the first.
    #[inline]
    pub fn is_closed(self) -> bool {
        !matches!(self, PartKind::Open)
    }
}

/// A planar shape made of polylines and polygon rings.
///
/// This is the exact-distance representation of a projected fragment.
/// Holes follow the exterior ring they belong to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanarShape {
    /// Vertex chains.
    pub parts: Vec<Vec<Point2D>>,
    /// Role of each part.
    pub kinds: Vec<PartKind>,
}

impl PlanarShape {
    /// Iterate over every segment of every part (closing segments included).
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.parts
            .iter()
            .zip(&self.kinds)
            .flat_map(|(part, &kind)| {
                let n = part.len();
                let count = match n {
                    0 => 0,
                    1 => 1,
                    _ if kind.is_closed() => n,
                    _ => n - 1,
                };
                (0..count).map(move |i| (part[i], part[(i + 1) % n]))
            })
    }

    /// Iterate over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.parts.iter().flatten().copied()
    }

    /// True if `p` lies inside a polygon: within its exterior ring and
    /// outside all of its holes.
    pub fn contains(&self, p: Point2D) -> bool {
        let mut inside = false;
        for (ring, &kind) in self.parts.iter().zip(&self.kinds) {
            match kind {
                PartKind::Hole => {
                    if inside && point_in_ring(p, ring) {
                        inside = false;
                    }
                }
                PartKind::Exterior => {
                    if inside {
                        return true;
                    }
                    inside = point_in_ring(p, ring);
                }
                PartKind::Open => {
                    if inside {
                        return true;
                    }
                }
            }
        }
        inside
    }

    /// Geometric centroid.
    ///
    /// Area centroid of the polygons (holes subtracted) when they enclose any
    /// area, otherwise the length-weighted centroid of the segments, otherwise
    /// the mean of the vertices.
    pub fn centroid(&self) -> Point2D {
        let mut area = 0.0;
        let mut moment = Point2D::ZERO;
        for (ring, &kind) in self.parts.iter().zip(&self.kinds) {
            if !kind.is_closed() || ring.len() < 3 {
                continue;
            }
            let (ring_area, ring_moment) = ring_moments(ring);
            // Exteriors add, holes subtract, whatever the winding
            let sign = match kind {
                PartKind::Hole => -ring_area.signum(),
                _ => ring_area.signum(),
            };
            area += sign * ring_area;
            moment = moment + ring_moment * sign;
        }
        if area > f64::EPSILON {
            return moment * (1.0 / (6.0 * area));
        }

        let mut length = 0.0;
        let mut weighted = Point2D::ZERO;
        for (a, b) in self.segments() {
            let len = a.distance(b);
            length += len;
            weighted = weighted + (a + b) * (0.5 * len);
        }
        if length > f64::EPSILON {
            return weighted * (1.0 / length);
        }

        let vertices: Vec<Point2D> = self.vertices().collect();
        compute_centroid(&vertices)
    }

    /// Minimum distance between two shapes.
    ///
    /// Zero when boundaries intersect or one shape lies inside a polygon
    /// of the other.
    pub fn distance_to(&self, other: &PlanarShape) -> f64 {
        if let Some(p) = other.vertices().next()
            && self.contains(p)
        {
            return 0.0;
        }
        if let Some(p) = self.vertices().next()
            && other.contains(p)
        {
            return 0.0;
        }

        let mut best = f64::INFINITY;
        for (a1, a2) in self.segments() {
            for (b1, b2) in other.segments() {
                best = best.min(segment_segment_distance(a1, a2, b1, b2));
                if best == 0.0 {
                    return 0.0;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn open(points: &[(f64, f64)]) -> PlanarShape {
        PlanarShape {
            parts: vec![points.iter().map(|&(x, y)| Point2D::new(x, y)).collect()],
            kinds: vec![PartKind::Open],
        }
    }

    fn square(lo: f64, hi: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(lo, lo),
            Point2D::new(hi, lo),
            Point2D::new(hi, hi),
            Point2D::new(lo, hi),
        ]
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(4.0, 0.0);

        assert_relative_eq!(point_segment_distance(Point2D::new(2.0, 1.5), a, b), 1.5);
        assert_relative_eq!(point_segment_distance(Point2D::new(7.0, 4.0), a, b), 5.0);
        assert_relative_eq!(point_segment_distance(Point2D::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_crossing_segments() {
        let d = segment_segment_distance(
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 2.0),
            Point2D::new(2.0, 0.0),
        );
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_parallel_segments() {
        let d = segment_segment_distance(
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(0.5, 0.3),
            Point2D::new(1.5, 0.3),
        );
        assert_relative_eq!(d, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_distance_polylines() {
        let a = open(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let b = open(&[(1.5, 0.5), (3.0, 0.5)]);
        assert_relative_eq!(a.distance_to(&b), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_inside_ring() {
        let ring = PlanarShape {
            parts: vec![vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
                Point2D::new(0.0, 10.0),
            ]],
            kinds: vec![PartKind::Exterior],
        };
        let inner = open(&[(4.0, 4.0), (5.0, 5.0)]);

        assert_eq!(ring.distance_to(&inner), 0.0);
        assert_eq!(inner.distance_to(&ring), 0.0);
    }

    #[test]
    fn test_hole_is_outside() {
        let frame = PlanarShape {
            parts: vec![square(0.0, 100.0), square(10.0, 90.0)],
            kinds: vec![PartKind::Exterior, PartKind::Hole],
        };
        assert!(frame.contains(Point2D::new(5.0, 50.0)));
        assert!(!frame.contains(Point2D::new(50.0, 50.0)));

        let slat = open(&[(49.0, 50.0), (51.0, 50.0)]);
        assert_relative_eq!(frame.distance_to(&slat), 39.0, epsilon = 1e-12);
        assert_relative_eq!(slat.distance_to(&frame), 39.0, epsilon = 1e-12);
    }

    #[test]
    fn test_contains_across_polygons() {
        // Second polygon follows the first one's hole
        let shape = PlanarShape {
            parts: vec![square(0.0, 10.0), square(2.0, 8.0), square(20.0, 30.0)],
            kinds: vec![PartKind::Exterior, PartKind::Hole, PartKind::Exterior],
        };
        assert!(shape.contains(Point2D::new(1.0, 1.0)));
        assert!(!shape.contains(Point2D::new(5.0, 5.0)));
        assert!(shape.contains(Point2D::new(25.0, 25.0)));
        assert!(!shape.contains(Point2D::new(15.0, 15.0)));
    }

    #[test]
    fn test_centroid_ignores_closing_vertex() {
        let mut ring = square(0.0, 2.0);
        ring.push(ring[0]);
        let polygon = PlanarShape {
            parts: vec![ring.clone()],
            kinds: vec![PartKind::Exterior],
        };
        let outline = PlanarShape {
            parts: vec![ring],
            kinds: vec![PartKind::Open],
        };

        let c = polygon.centroid();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
        let c = outline.centroid();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centroid_weights_by_length_and_area() {
        // Dense vertices at one end do not pull the centroid
        let line = open(&[(0.0, 0.0), (0.1, 0.0), (0.2, 0.0), (10.0, 0.0)]);
        assert_relative_eq!(line.centroid().x, 5.0, epsilon = 1e-12);

        // Hole in the left half shifts the centroid right
        let mut hole = vec![
            Point2D::new(1.0, 1.0),
            Point2D::new(1.0, 3.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(3.0, 1.0),
        ];
        hole.reverse();
        let frame = PlanarShape {
            parts: vec![square(0.0, 8.0), hole],
            kinds: vec![PartKind::Exterior, PartKind::Hole],
        };
        // (64 * 4 - 4 * 2) / 60
        let c = frame.centroid();
        assert_relative_eq!(c.x, 248.0 / 60.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 248.0 / 60.0, epsilon = 1e-12);

        assert_eq!(open(&[(3.0, 4.0)]).centroid(), Point2D::new(3.0, 4.0));
    }

    #[test]
    fn test_single_vertex_part() {
        let a = open(&[(0.0, 0.0)]);
        let b = open(&[(3.0, 4.0)]);
        assert_eq!(a.segments().count(), 1);
        assert_relative_eq!(a.distance_to(&b), 5.0, epsilon = 1e-12);
    }
}
