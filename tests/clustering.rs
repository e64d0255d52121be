//! Clustering integration tests over synthetic city layouts.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use ousposer::clustering::{ClusterParams, Clustering, ClusteringEngine, cluster_zone};
use ousposer::config::ClusteringConfig;
use ousposer::core::{CoordinateSystem, Point2D};
use ousposer::index::IndexKind;
use ousposer::{Fragment, FragmentId, FragmentStore, Zone};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use common::{random_city, slat, store};

/// All candidates of all zones, as sorted fragment-id lists.
fn partition(clusterings: &BTreeMap<Zone, Clustering>) -> Vec<Vec<FragmentId>> {
    let mut groups: Vec<Vec<FragmentId>> = clusterings
        .values()
        .flat_map(|c| c.candidates.iter().map(|cand| cand.fragments.clone()))
        .collect();
    groups.sort();
    groups
}

fn engine(index: IndexKind) -> ClusteringEngine {
    ClusteringEngine::new(ClusteringConfig {
        index,
        ..ClusteringConfig::default()
    })
}

#[test]
fn test_partition_recovers_objects() {
    let (fragments, truth) = random_city(11, 400, 5);
    let store = store(fragments);

    let clusterings = engine(IndexKind::RTree).cluster_store(&store);
    let groups = partition(&clusterings);

    // Every fragment in exactly one non-empty candidate
    let mut seen = BTreeSet::new();
    for group in &groups {
        assert!(!group.is_empty());
        for id in group {
            assert!(seen.insert(*id), "fragment {id} assigned twice");
        }
    }
    assert_eq!(seen.len(), store.len());

    assert_eq!(groups, truth);
}

#[test]
fn test_assignment_map_matches_candidates() {
    let (fragments, _) = random_city(5, 100, 2);
    let store = store(fragments);

    for clustering in engine(IndexKind::Grid).cluster_store(&store).values() {
        for candidate in &clustering.candidates {
            assert_eq!(candidate.id.0, candidate.fragments[0].0);
            for &id in &candidate.fragments {
                assert_eq!(clustering.candidate_of(id), Some(candidate.id));
            }
        }
    }
}

#[test]
fn test_grid_and_rtree_agree() {
    let (fragments, _) = random_city(23, 300, 3);
    let store = store(fragments);

    let grid = partition(&engine(IndexKind::Grid).cluster_store(&store));
    let rtree = partition(&engine(IndexKind::RTree).cluster_store(&store));
    assert_eq!(grid, rtree);
}

#[test]
fn test_deterministic_under_input_order() {
    let (fragments, _) = random_city(42, 200, 1);
    let params = ClusterParams {
        max_components: Some(2),
        ..ClusterParams::default()
    };
    let zone = Zone::new("1");

    let run = |order: &[Fragment]| {
        let refs: Vec<&Fragment> = order.iter().collect();
        let clustering = cluster_zone(&zone, &refs, CoordinateSystem::Geographic, &params);
        clustering
            .candidates
            .iter()
            .map(|c| c.fragments.clone())
            .collect::<Vec<_>>()
    };

    let reference = run(&fragments);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..5 {
        let mut shuffled = fragments.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(run(&shuffled), reference);
    }
}

#[test]
fn test_per_zone_threshold_override() {
    // Two slats 2 m apart in each of two zones
    let fragments = vec![
        slat(1, "4", Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)),
        slat(2, "4", Point2D::new(3.0, 0.0), Point2D::new(4.0, 0.0)),
        slat(3, "5", Point2D::new(0.0, 50.0), Point2D::new(1.0, 50.0)),
        slat(4, "5", Point2D::new(3.0, 50.0), Point2D::new(4.0, 50.0)),
    ];
    let store: FragmentStore = store(fragments);

    let config = ClusteringConfig {
        zone_thresholds: BTreeMap::from([("4".to_string(), 1.5)]),
        ..ClusteringConfig::default()
    };
    let clusterings = ClusteringEngine::new(config).cluster_store(&store);

    assert_eq!(clusterings[&Zone::new("4")].candidates.len(), 2);
    assert_eq!(clusterings[&Zone::new("5")].candidates.len(), 1);
}

#[test]
fn test_component_cap_bounds_candidate_size() {
    let (fragments, _) = random_city(8, 150, 1);
    let store = store(fragments);
    let config = ClusteringConfig {
        max_components: Some(2),
        ..ClusteringConfig::default()
    };

    let clusterings = ClusteringEngine::new(config).cluster_store(&store);
    let groups = partition(&clusterings);
    assert!(groups.iter().all(|g| (1..=2).contains(&g.len())));
    assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), store.len());
}

#[test]
fn test_zone_without_fragments() {
    let store = store(vec![]);
    assert!(engine(IndexKind::RTree).cluster_store(&store).is_empty());

    let clustering = cluster_zone(
        &Zone::new("9"),
        &[],
        CoordinateSystem::Geographic,
        &ClusterParams::default(),
    );
    assert!(clustering.candidates.is_empty());
}
