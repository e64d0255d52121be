//! Spatial indexes for proximity-edge candidate search.
//!
//! Clustering never compares every pair of fragments. Each fragment's
//! bounding box, expanded by the proximity threshold, is used as a query
//! window; the index returns the fragments whose boxes intersect it and
//! only those are measured exactly.
//!
//! Two interchangeable implementations:
//! - [`GridIndex`]: uniform hash grid, cheap to build, good for dense zones
//! - [`RTreeIndex`]: `rstar` R-tree, robust to uneven density
//!
//! Both return the same candidate set for the same input (boxes whose
//! envelopes intersect the window), sorted ascending, so the clustering
//! result does not depend on the index kind.

mod grid;
mod rtree;

pub use grid::GridIndex;
pub use rtree::RTreeIndex;

use serde::{Deserialize, Serialize};

use crate::core::Bounds;

/// Box-intersection index over fragment bounding boxes.
///
/// Items are identified by their position in the slice given at build time.
pub trait SpatialIndex: Send + Sync {
    /// Indices of all items whose box intersects `window`.
    ///
    /// The buffer is cleared first and left sorted and deduplicated.
    fn query_into(&self, window: &Bounds, buffer: &mut Vec<usize>);

    /// Number of indexed items.
    fn len(&self) -> usize;

    /// Check if the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocating convenience wrapper around [`SpatialIndex::query_into`].
    fn query(&self, window: &Bounds) -> Vec<usize> {
        let mut result = Vec::new();
        self.query_into(window, &mut result);
        result
    }
}

/// Which index implementation clustering should use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Uniform hash grid.
    Grid,
    /// R-tree.
    #[default]
    RTree,
}

impl IndexKind {
    /// Build an index of this kind.
    ///
    /// # Arguments
    /// * `boxes` - Item bounding boxes (empty boxes are never returned)
    /// * `cell_size` - Grid cell size in meters (ignored by the R-tree)
    pub fn build(self, boxes: &[Bounds], cell_size: f64) -> Box<dyn SpatialIndex> {
        match self {
            IndexKind::Grid => Box::new(GridIndex::build(boxes, cell_size)),
            IndexKind::RTree => Box::new(RTreeIndex::build(boxes)),
        }
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Grid => write!(f, "grid"),
            IndexKind::RTree => write!(f, "rtree"),
        }
    }
}
