//! Uniform grid for approximate neighbour queries on large graphs.
//!
//! Space is bucketed into square cells of [`CELL_SIZE`] units keyed by
//! `(floor(x / CELL_SIZE), floor(y / CELL_SIZE))`. A neighbourhood query
//! returns every node in the 5×5 block of cells centred on a point, which
//! covers all nodes closer than `2 * CELL_SIZE` along each axis.

use std::collections::HashMap;

use crate::Position;

/// Edge length of a grid cell in layout units.
pub const CELL_SIZE: f64 = 100.0;

/// Cells searched in each direction around the query cell.
const REACH: i64 = 2;

type CellKey = (i64, i64);

/// A spatial hash of node indices.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket every position by its cell.
    ///
    /// # Arguments
    /// * `positions` - Slice of node positions; indices are returned by queries
    pub fn build(positions: &[Position]) -> Self {
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        for (i, pos) in positions.iter().enumerate() {
            cells.entry(cell_of(pos)).or_default().push(i);
        }
        Self { cells }
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Node indices in the 5×5 block of cells around `pos`, including any
    /// node at `pos` itself.
    pub fn neighbors(&self, pos: &Position) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = cell_of(pos);
        (-REACH..=REACH)
            .flat_map(move |dx| (-REACH..=REACH).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(|key| self.cells.get(&key))
            .flatten()
            .copied()
    }
}

fn cell_of(pos: &Position) -> CellKey {
    (
        (pos.x / CELL_SIZE).floor() as i64,
        (pos.y / CELL_SIZE).floor() as i64,
    )
}
