//! R-tree index backed by `rstar`.

use rstar::{AABB, RTree, RTreeObject};

use super::SpatialIndex;
use crate::core::Bounds;

/// An item bounding box tagged with its position in the build slice.
#[derive(Clone, Debug)]
struct IndexedBox {
    bounds: Bounds,
    index: usize,
}

impl RTreeObject for IndexedBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_aabb(&self.bounds)
    }
}

#[inline]
fn to_aabb(b: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners([b.min.x, b.min.y], [b.max.x, b.max.y])
}

/// R-tree over item bounding boxes.
///
/// Bulk-loaded once per zone; clustering never mutates it.
#[derive(Clone)]
pub struct RTreeIndex {
    tree: RTree<IndexedBox>,
    len: usize,
}

impl RTreeIndex {
    /// Bulk-load an R-tree. Empty boxes are counted but not inserted.
    pub fn build(boxes: &[Bounds]) -> Self {
        let items: Vec<IndexedBox> = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(|(index, b)| IndexedBox { bounds: *b, index })
            .collect();

        Self {
            tree: RTree::bulk_load(items),
            len: boxes.len(),
        }
    }
}

impl SpatialIndex for RTreeIndex {
    fn query_into(&self, window: &Bounds, buffer: &mut Vec<usize>) {
        buffer.clear();
        if window.is_empty() {
            return;
        }

        buffer.extend(
            self.tree
                .locate_in_envelope_intersecting(&to_aabb(window))
                .map(|item| item.index),
        );
        buffer.sort_unstable();
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}
