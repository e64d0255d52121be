//! Clustering of fragments into candidate objects.
//!
//! Fragments of the same zone are nodes of a proximity graph; an edge joins
//! two fragments whose geometries come strictly closer than the zone's
//! threshold. Candidates are the (optionally size-capped) components of
//! that graph. See [`cluster_zone`] for the traversal rules.
//!
//! # Example
//! ```rust,ignore
//! use ousposer::clustering::ClusteringEngine;
//!
//! let engine = ClusteringEngine::new(config.clustering.clone());
//! for (zone, clustering) in engine.cluster_store(&store) {
//!     println!("{zone}: {} candidates", clustering.candidates.len());
//! }
//! ```

mod candidate;
mod engine;

pub use candidate::{CandidateId, CandidateObject};
pub use engine::{ClusterParams, Clustering, cluster_zone};

use std::collections::BTreeMap;

use crate::config::ClusteringConfig;
use crate::fragment::{Fragment, FragmentStore, Zone};

/// Clustering with per-zone parameter resolution.
#[derive(Clone, Debug, Default)]
pub struct ClusteringEngine {
    config: ClusteringConfig,
}

impl ClusteringEngine {
    /// Create an engine from clustering settings.
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// The settings in use.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Cluster one zone with that zone's parameters.
    pub fn cluster(
        &self,
        zone: &Zone,
        fragments: &[&Fragment],
        store: &FragmentStore,
    ) -> Clustering {
        let params = self.config.params_for(zone);
        cluster_zone(zone, fragments, store.coordinate_system(), &params)
    }

    /// Cluster every zone of a store sequentially.
    pub fn cluster_store(&self, store: &FragmentStore) -> BTreeMap<Zone, Clustering> {
        store
            .by_zone()
            .into_iter()
            .map(|(zone, fragments)| {
                let clustering = self.cluster(&zone, &fragments, store);
                (zone, clustering)
            })
            .collect()
    }
}
