//! Proximity threshold suggestion from labeled multi-component examples.
//!
//! For each example the pairwise distances between member centroids are
//! measured; per component count, the maximum pairwise distance is
//! summarized and `mean + std` of it is suggested as the clustering
//! threshold that would have kept those examples together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::labels::LabeledExample;
use crate::core::math::{mean, std_dev};
use crate::core::{GeoPoint, LocalFrame, Point2D};
use crate::fragment::{FragmentStore, Geometry};

/// Threshold suggestion for one component count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximitySuggestion {
    /// Number of fragments per example.
    pub component_count: usize,
    /// Examples measured.
    pub sample_count: usize,
    /// Mean over examples of the closest member pair distance.
    pub min_distance_mean: f64,
    /// Mean over examples of the farthest member pair distance.
    pub max_distance_mean: f64,
    /// Population standard deviation of the farthest pair distance.
    pub max_distance_std: f64,
    /// `max_distance_mean + max_distance_std`, in meters.
    pub suggested_threshold_m: f64,
}

/// Pairwise centroid distances (min, max) of one example, in meters.
///
/// Returns `None` if a member is missing from the store or malformed.
fn centroid_spread(example: &LabeledExample, store: &FragmentStore) -> Option<(f64, f64)> {
    let system = store.coordinate_system();
    let mut members: Vec<&Geometry> = Vec::with_capacity(example.fragment_ids.len());
    for &id in &example.fragment_ids {
        let fragment = store.get(id)?;
        fragment.geometry.validate(system).ok()?;
        members.push(&fragment.geometry);
    }

    let all: Vec<GeoPoint> = members.iter().flat_map(|g| g.points()).collect();
    let frame = LocalFrame::centered_on(&all, system)?;
    let centroids: Vec<Point2D> = members
        .iter()
        .map(|g| g.to_planar(&frame).centroid())
        .collect();

    let mut min = f64::INFINITY;
    let mut max = 0.0_f64;
    for i in 0..centroids.len() {
        for j in (i + 1)..centroids.len() {
            let d = centroids[i].distance(centroids[j]);
            min = min.min(d);
            max = max.max(d);
        }
    }
    min.is_finite().then_some((min, max))
}

/// Summarize multi-component examples by component count.
///
/// Examples with fewer than two fragments are ignored.
pub fn suggest_thresholds<'a>(
    examples: impl IntoIterator<Item = &'a LabeledExample>,
    store: &FragmentStore,
) -> Vec<ProximitySuggestion> {
    let mut groups: BTreeMap<usize, Vec<(f64, f64)>> = BTreeMap::new();
    for example in examples {
        if example.component_count() < 2 {
            continue;
        }
        match centroid_spread(example, store) {
            Some(spread) => groups.entry(example.component_count()).or_default().push(spread),
            None => log::debug!(
                "Calibration: example {} skipped for proximity (missing or malformed member)",
                example.id.as_deref().unwrap_or("?")
            ),
        }
    }

    groups
        .into_iter()
        .filter_map(|(component_count, spreads)| {
            let mins: Vec<f64> = spreads.iter().map(|s| s.0).collect();
            let maxs: Vec<f64> = spreads.iter().map(|s| s.1).collect();
            let max_mean = mean(&maxs)?;
            let max_std = std_dev(&maxs)?;
            Some(ProximitySuggestion {
                component_count,
                sample_count: spreads.len(),
                min_distance_mean: mean(&mins)?,
                max_distance_mean: max_mean,
                max_distance_std: max_std,
                suggested_threshold_m: max_mean + max_std,
            })
        })
        .collect()
}
