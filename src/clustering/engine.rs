//! Proximity-graph clustering of one zone.
//!
//! # Algorithm
//!
//! 1. Project every valid fragment into a tangent plane centered on the zone
//! 2. Index fragment bounding boxes ([`SpatialIndex`])
//! 3. For each unassigned fragment in ascending id (the seed), grow a
//!    cluster breadth-first: query the index with the current fragment's box
//!    expanded by the threshold, and admit every unassigned neighbor (in
//!    ascending id) whose exact geometry distance is strictly below it
//! 4. With a component cap, stop admitting once the cluster is full; the
//!    leftovers seed later clusters
//!
//! Without a cap the result is exactly the connected components of the
//! proximity graph. With a cap, a fragment within reach of two clusters
//! joins the one whose traversal reaches it first.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::candidate::{CandidateId, CandidateObject};
use crate::core::{Bounds, CoordinateSystem, GeoPoint, LocalFrame, PlanarShape};
use crate::error::GeometryError;
use crate::fragment::{Fragment, FragmentId, Zone};
use crate::index::{IndexKind, SpatialIndex};

/// Clustering parameters resolved for one zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Two fragments are adjacent iff their distance is strictly below this (meters).
    pub threshold_m: f64,
    /// Maximum fragments per candidate (unbounded if `None`).
    pub max_components: Option<usize>,
    /// Spatial index implementation.
    pub index: IndexKind,
    /// Grid cell size (meters); defaults to twice the threshold.
    pub cell_size_m: Option<f64>,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            threshold_m: crate::config::defaults::proximity_threshold_m(),
            max_components: None,
            index: IndexKind::default(),
            cell_size_m: None,
        }
    }
}

impl ClusterParams {
    /// Parameters with the given threshold and defaults otherwise.
    pub fn with_threshold(threshold_m: f64) -> Self {
        Self {
            threshold_m,
            ..Self::default()
        }
    }

    #[inline]
    fn cell_size(&self) -> f64 {
        self.cell_size_m.unwrap_or(self.threshold_m * 2.0)
    }
}

/// Clustering of one zone.
#[derive(Clone, Debug, Default)]
pub struct Clustering {
    /// Candidates in ascending id order.
    pub candidates: Vec<CandidateObject>,
    /// Parent candidate of every clustered fragment.
    pub assignment: BTreeMap<FragmentId, CandidateId>,
    /// Exact distance evaluations performed.
    pub distance_checks: usize,
}

impl Clustering {
    /// Candidate a fragment was assigned to.
    #[inline]
    pub fn candidate_of(&self, id: FragmentId) -> Option<CandidateId> {
        self.assignment.get(&id).copied()
    }

    /// Number of candidates flagged as defective.
    pub fn defective_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_defective()).count()
    }
}

/// Partition the fragments of one zone into candidate objects.
///
/// Input order does not matter; duplicate ids are collapsed to one.
///
/// # Arguments
/// * `zone` - Zone tag copied onto every candidate
/// * `fragments` - The zone's fragments
/// * `system` - Coordinate system of the geometries
/// * `params` - Threshold, cap and index choice for this zone
pub fn cluster_zone(
    zone: &Zone,
    fragments: &[&Fragment],
    system: CoordinateSystem,
    params: &ClusterParams,
) -> Clustering {
    let mut sorted: Vec<&Fragment> = fragments.to_vec();
    sorted.sort_by_key(|f| f.id);
    sorted.dedup_by_key(|f| f.id);

    if sorted.is_empty() {
        return Clustering::default();
    }

    let shapes = project_zone(&sorted, system);
    let boxes: Vec<Bounds> = shapes
        .iter()
        .map(|s| match s {
            Ok(shape) => Bounds::from_points(&shape.vertices().collect::<Vec<_>>()),
            Err(_) => Bounds::empty(),
        })
        .collect();
    let index = params.index.build(&boxes, params.cell_size());

    let cap = params.max_components.unwrap_or(usize::MAX).max(1);
    let threshold = params.threshold_m;

    let mut owner: Vec<Option<CandidateId>> = vec![None; sorted.len()];
    let mut result = Clustering::default();
    let mut queue = VecDeque::new();
    let mut neighbors = Vec::new();

    for seed in 0..sorted.len() {
        if owner[seed].is_some() {
            continue;
        }
        let id = CandidateId::from(sorted[seed].id);
        owner[seed] = Some(id);
        let mut members = vec![seed];

        if shapes[seed].is_ok() {
            queue.clear();
            queue.push_back(seed);

            'grow: while let Some(current) = queue.pop_front() {
                let Ok(current_shape) = &shapes[current] else {
                    continue;
                };
                index.query_into(&boxes[current].expand(threshold), &mut neighbors);

                for &j in &neighbors {
                    if members.len() >= cap {
                        break 'grow;
                    }
                    if owner[j].is_some() {
                        continue;
                    }
                    let Ok(other) = &shapes[j] else {
                        continue;
                    };
                    result.distance_checks += 1;
                    if current_shape.distance_to(other) < threshold {
                        owner[j] = Some(id);
                        members.push(j);
                        queue.push_back(j);
                    }
                }
            }
        }

        members.sort_unstable();
        let ids: Vec<FragmentId> = members.iter().map(|&m| sorted[m].id).collect();
        for &fid in &ids {
            result.assignment.insert(fid, id);
        }
        result.candidates.push(CandidateObject {
            id,
            zone: zone.clone(),
            fragments: ids,
            vertex_count: members
                .iter()
                .map(|&m| sorted[m].geometry.vertex_count())
                .sum(),
            defect: shapes[seed].as_ref().err().cloned(),
        });
    }

    log::debug!(
        "Clustering: zone {} -> {} candidates from {} fragments ({} distance checks, {} index)",
        zone,
        result.candidates.len(),
        sorted.len(),
        result.distance_checks,
        params.index
    );

    result
}

/// Validate and project every fragment into a frame centered on the zone.
fn project_zone(
    fragments: &[&Fragment],
    system: CoordinateSystem,
) -> Vec<Result<PlanarShape, GeometryError>> {
    let validity: Vec<Result<(), GeometryError>> = fragments
        .iter()
        .map(|f| f.geometry.validate(system))
        .collect();

    let valid_points: Vec<GeoPoint> = fragments
        .iter()
        .zip(&validity)
        .filter(|(_, v)| v.is_ok())
        .flat_map(|(f, _)| f.geometry.points())
        .collect();

    let Some(frame) = LocalFrame::centered_on(&valid_points, system) else {
        return validity
            .into_iter()
            .map(|v| v.and(Err(GeometryError::Empty)))
            .collect();
    };

    fragments
        .iter()
        .zip(validity)
        .map(|(f, v)| {
            if let Err(err) = v {
                log::warn!("Clustering: fragment {} skipped: {}", f.id, err);
                return Err(err);
            }
            Ok(f.geometry.to_planar(&frame))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Geometry;

    fn segment(id: u64, x0: f64, y0: f64, x1: f64, y1: f64) -> Fragment {
        Fragment::new(
            id,
            None,
            Geometry::LineString(vec![GeoPoint::new(x0, y0), GeoPoint::new(x1, y1)]),
        )
    }

    fn ids(c: &CandidateObject) -> Vec<u64> {
        c.fragments.iter().map(|f| f.0).collect()
    }

    fn run(fragments: &[Fragment], params: &ClusterParams) -> Clustering {
        let refs: Vec<&Fragment> = fragments.iter().collect();
        cluster_zone(&Zone::new("1"), &refs, CoordinateSystem::Projected, params)
    }

    #[test]
    fn test_connected_components() {
        // 1-2-3 chained (1 m gaps), 4 isolated
        let fragments = vec![
            segment(3, 4.0, 0.0, 5.0, 0.0),
            segment(1, 0.0, 0.0, 1.0, 0.0),
            segment(2, 2.0, 0.0, 3.0, 0.0),
            segment(4, 50.0, 0.0, 51.0, 0.0),
        ];
        let result = run(&fragments, &ClusterParams::with_threshold(1.5));

        assert_eq!(result.candidates.len(), 2);
        assert_eq!(ids(&result.candidates[0]), vec![1, 2, 3]);
        assert_eq!(result.candidates[0].id, CandidateId(1));
        assert_eq!(ids(&result.candidates[1]), vec![4]);
        assert_eq!(result.candidate_of(FragmentId(3)), Some(CandidateId(1)));
        assert_eq!(result.candidates[0].vertex_count, 6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let fragments = vec![segment(1, 0.0, 0.0, 1.0, 0.0), segment(2, 2.0, 0.0, 3.0, 0.0)];

        assert_eq!(run(&fragments, &ClusterParams::with_threshold(1.0)).candidates.len(), 2);
        assert_eq!(run(&fragments, &ClusterParams::with_threshold(1.01)).candidates.len(), 1);
    }

    #[test]
    fn test_component_cap_first_reach_wins() {
        // 2 is within reach of both 1 and 3; cap of 2
        let fragments = vec![
            segment(1, 0.0, 0.0, 1.0, 0.0),
            segment(2, 2.0, 0.0, 3.0, 0.0),
            segment(3, 4.0, 0.0, 5.0, 0.0),
        ];
        let params = ClusterParams {
            max_components: Some(2),
            ..ClusterParams::with_threshold(1.5)
        };
        let result = run(&fragments, &params);

        assert_eq!(result.candidates.len(), 2);
        assert_eq!(ids(&result.candidates[0]), vec![1, 2]);
        assert_eq!(ids(&result.candidates[1]), vec![3]);
    }

    #[test]
    fn test_malformed_becomes_defective_singleton() {
        let fragments = vec![
            segment(1, 0.0, 0.0, 1.0, 0.0),
            Fragment::new(2, None, Geometry::LineString(vec![])),
            segment(3, 1.5, 0.0, 2.5, 0.0),
        ];
        let result = run(&fragments, &ClusterParams::with_threshold(1.0));

        assert_eq!(result.candidates.len(), 2);
        assert_eq!(ids(&result.candidates[0]), vec![1, 3]);
        assert_eq!(ids(&result.candidates[1]), vec![2]);
        assert_eq!(result.candidates[1].defect, Some(GeometryError::Empty));
        assert_eq!(result.defective_count(), 1);
    }

    #[test]
    fn test_empty_zone() {
        let result = run(&[], &ClusterParams::default());
        assert!(result.candidates.is_empty());
        assert!(result.assignment.is_empty());
    }

    #[test]
    fn test_polygon_containment_is_adjacent() {
        // A slat drawn inside a frame polygon is at distance zero
        let frame = Fragment::new(
            1,
            None,
            Geometry::Polygon(vec![vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(20.0, 0.0),
                GeoPoint::new(20.0, 20.0),
                GeoPoint::new(0.0, 20.0),
                GeoPoint::new(0.0, 0.0),
            ]]),
        );
        let inner = segment(2, 9.0, 10.0, 11.0, 10.0);
        let result = run(&[frame, inner], &ClusterParams::with_threshold(0.1));
        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn test_polygon_hole_is_not_adjacent() {
        let square = |lo: f64, hi: f64| {
            vec![
                GeoPoint::new(lo, lo),
                GeoPoint::new(hi, lo),
                GeoPoint::new(hi, hi),
                GeoPoint::new(lo, hi),
                GeoPoint::new(lo, lo),
            ]
        };
        let frame = Fragment::new(
            1,
            None,
            Geometry::Polygon(vec![square(0.0, 100.0), square(10.0, 90.0)]),
        );
        // 39 m from every boundary of the hole
        let inner = segment(2, 49.0, 50.0, 51.0, 50.0);
        let result = run(&[frame, inner], &ClusterParams::with_threshold(1.0));
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(ids(&result.candidates[0]), vec![1]);
        assert_eq!(ids(&result.candidates[1]), vec![2]);
    }
}
