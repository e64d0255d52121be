//! Uniform hash-grid index.
//!
//! Each box is stored in every cell its extent overlaps; a query visits the
//! cells overlapping the window and keeps the items whose box actually
//! intersects it.
//!
//! - Build: O(m × cells per box)
//! - Query: O(k) where k = items in the visited cells

use std::collections::HashMap;

use super::SpatialIndex;
use crate::core::Bounds;

/// Smallest allowed cell size in meters.
///
/// Guards against a zero or tiny threshold blowing up the cell count.
pub const MIN_CELL_SIZE: f64 = 0.05;

/// Grid cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
}

impl CellCoord {
    #[inline]
    fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Hash-grid index over item bounding boxes.
///
/// # Example
/// ```rust,ignore
/// use ousposer::index::{GridIndex, SpatialIndex};
///
/// let index = GridIndex::build(&boxes, 7.0);
/// let near = index.query(&boxes[0].expand(3.5));
/// ```
#[derive(Clone, Debug)]
pub struct GridIndex {
    /// Cell size in meters.
    cell_size: f64,
    /// Inverse cell size for fast coordinate conversion.
    inv_cell_size: f64,
    /// Map from cell coordinate to item indices in that cell.
    cells: HashMap<CellCoord, Vec<usize>>,
    /// Item boxes, for exact intersection filtering.
    boxes: Vec<Bounds>,
}

impl GridIndex {
    /// Build a grid index.
    ///
    /// # Arguments
    /// * `boxes` - Item bounding boxes
    /// * `cell_size` - Cell size in meters (clamped to [`MIN_CELL_SIZE`])
    pub fn build(boxes: &[Bounds], cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.max(MIN_CELL_SIZE)
        } else {
            MIN_CELL_SIZE
        };
        let inv_cell_size = 1.0 / cell_size;

        let mut index = Self {
            cell_size,
            inv_cell_size,
            cells: HashMap::new(),
            boxes: boxes.to_vec(),
        };

        for (i, b) in boxes.iter().enumerate() {
            if b.is_empty() {
                continue;
            }
            let (min, max) = index.cell_range(b);
            for cx in min.x..=max.x {
                for cy in min.y..=max.y {
                    index.cells.entry(CellCoord::new(cx, cy)).or_default().push(i);
                }
            }
        }

        index
    }

    /// Cell size in meters.
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Inclusive range of cells covered by a box.
    #[inline]
    fn cell_range(&self, b: &Bounds) -> (CellCoord, CellCoord) {
        let to_cell = |v: f64| (v * self.inv_cell_size).floor() as i64;
        (
            CellCoord::new(to_cell(b.min.x), to_cell(b.min.y)),
            CellCoord::new(to_cell(b.max.x), to_cell(b.max.y)),
        )
    }
}

impl SpatialIndex for GridIndex {
    fn query_into(&self, window: &Bounds, buffer: &mut Vec<usize>) {
        buffer.clear();
        if window.is_empty() || self.cells.is_empty() {
            return;
        }

        let (min, max) = self.cell_range(window);
        let span = (max.x - min.x + 1).saturating_mul(max.y - min.y + 1);

        if span as usize > self.cells.len() {
            // Window covers more cells than are occupied: walk the occupied ones.
            for (coord, indices) in &self.cells {
                if (min.x..=max.x).contains(&coord.x) && (min.y..=max.y).contains(&coord.y) {
                    buffer.extend(indices.iter().copied());
                }
            }
        } else {
            for cx in min.x..=max.x {
                for cy in min.y..=max.y {
                    if let Some(indices) = self.cells.get(&CellCoord::new(cx, cy)) {
                        buffer.extend(indices.iter().copied());
                    }
                }
            }
        }

        // Items spanning several cells appear more than once
        buffer.sort_unstable();
        buffer.dedup();
        buffer.retain(|&i| self.boxes[i].intersects(window));
    }

    #[inline]
    fn len(&self) -> usize {
        self.boxes.len()
    }
}
