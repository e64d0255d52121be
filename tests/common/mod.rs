//! Shared fixtures: synthetic street furniture around central Paris.

#![allow(dead_code)]

use ousposer::core::{CoordinateSystem, GeoPoint, LocalFrame, Point2D};
use ousposer::{Fragment, FragmentId, FragmentStore, Geometry, Zone};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Fixture origin (Hôtel de Ville).
pub const ORIGIN: GeoPoint = GeoPoint::new(2.3522, 48.8566);

/// Tangent frame used to lay out fixtures in meters.
pub fn frame() -> LocalFrame {
    LocalFrame::new(ORIGIN, CoordinateSystem::Geographic)
}

/// Corners of a `long` x `short` rectangle centered at `center` (meters),
/// rotated by `angle` radians, counter-clockwise.
pub fn rect_corners(center: (f64, f64), long: f64, short: f64, angle: f64) -> [Point2D; 4] {
    let (s, c) = angle.sin_cos();
    let (hl, hs) = (long / 2.0, short / 2.0);
    [(-hl, -hs), (hl, -hs), (hl, hs), (-hl, hs)].map(|(x, y)| {
        Point2D::new(center.0 + x * c - y * s, center.1 + x * s + y * c)
    })
}

fn to_geo(points: &[Point2D]) -> Vec<GeoPoint> {
    let frame = frame();
    points.iter().map(|&p| frame.unproject(p)).collect()
}

/// Closed rectangular outline as a polygon fragment.
pub fn rect_fragment(
    id: u64,
    zone: &str,
    center: (f64, f64),
    long: f64,
    short: f64,
    angle: f64,
) -> Fragment {
    let c = rect_corners(center, long, short, angle);
    let ring = to_geo(&[c[0], c[1], c[2], c[3], c[0]]);
    Fragment::new(id, Some(Zone::new(zone)), Geometry::Polygon(vec![ring]))
}

/// Straight two-vertex slat between two points (meters).
pub fn slat(id: u64, zone: &str, from: Point2D, to: Point2D) -> Fragment {
    Fragment::new(
        id,
        Some(Zone::new(zone)),
        Geometry::LineString(to_geo(&[from, to])),
    )
}

/// Four slats outlining a rectangle (a frame bench digitized side by side).
pub fn frame_fragments(
    first_id: u64,
    zone: &str,
    center: (f64, f64),
    long: f64,
    short: f64,
) -> Vec<Fragment> {
    let c = rect_corners(center, long, short, 0.0);
    (0..4)
        .map(|i| slat(first_id + i as u64, zone, c[i], c[(i + 1) % 4]))
        .collect()
}

/// Synthetic city: objects on a 12 m grid, each digitized as 1-4 sides of
/// a random rectangle. Ids are shuffled so seed order differs from layout.
///
/// Returns the fragments and, per object, its fragment ids (ascending).
pub fn random_city(seed: u64, objects: usize, zones: usize) -> (Vec<Fragment>, Vec<Vec<FragmentId>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let side = (objects as f64).sqrt().ceil() as usize;

    let mut shapes = Vec::with_capacity(objects);
    let mut total = 0;
    for k in 0..objects {
        let center = ((k % side) as f64 * 12.0, (k / side) as f64 * 12.0);
        let long = rng.random_range(2.0..4.0);
        let short = rng.random_range(0.5..1.6);
        let angle = rng.random_range(0.0..std::f64::consts::PI);
        let sides = rng.random_range(1..=4usize);
        let zone = rng.random_range(1..=zones).to_string();
        shapes.push((rect_corners(center, long, short, angle), sides, zone));
        total += sides;
    }

    let mut ids: Vec<u64> = (1..=total as u64).collect();
    ids.shuffle(&mut rng);
    let mut next = ids.into_iter();

    let mut fragments = Vec::with_capacity(total);
    let mut truth = Vec::with_capacity(objects);
    for (corners, sides, zone) in shapes {
        let mut members = Vec::with_capacity(sides);
        for i in 0..sides {
            let Some(id) = next.next() else { break };
            fragments.push(slat(id, &zone, corners[i], corners[(i + 1) % 4]));
            members.push(FragmentId(id));
        }
        members.sort();
        truth.push(members);
    }
    truth.sort();
    (fragments, truth)
}

/// Store over geographic fixtures.
pub fn store(fragments: Vec<Fragment>) -> FragmentStore {
    FragmentStore::from_fragments(CoordinateSystem::Geographic, fragments)
}
