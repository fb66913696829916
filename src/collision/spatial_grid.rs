// Implements an unbounded hashed uniform grid for broad-phase collision detection.

use std::collections::{HashMap, HashSet};

use crate::collision::AABB;
use crate::error::{PhysicsError, Result};
use crate::math::vec2::Vec2;

/// Integer coordinates of a grid cell.
pub type CellCoord = (i32, i32);

/// Bodies spanning more cells than this are kept in a separate list that is
/// paired against everything, instead of being written into every cell.
const MAX_CELLS_PER_BODY: i64 = 4096;

/// A uniform spatial grid keyed by cell coordinate. Any world position maps to
/// a cell, so there is no fixed world bound.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    inv_cell_size: f64, // 1.0 / cell_size, cached
    cells: HashMap<CellCoord, Vec<usize>>,
    body_cells: HashMap<usize, Vec<CellCoord>>,
    oversized: Vec<usize>,
}

impl SpatialGrid {
    /// Creates an empty grid. `cell_size` must be positive and finite.
    pub fn new(cell_size: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(PhysicsError::Config(format!(
                "cell size must be positive and finite, got {}",
                cell_size
            )));
        }
        Ok(SpatialGrid {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            body_cells: HashMap::new(),
            oversized: Vec::new(),
        })
    }

    // --- Helper Methods ---

    /// Converts world coordinates to a cell coordinate. Saturates at the `i32` range.
    #[inline]
    fn cell_of(&self, point: Vec2) -> CellCoord {
        let col = (point.x * self.inv_cell_size).floor() as i32;
        let row = (point.y * self.inv_cell_size).floor() as i32;
        (col, row)
    }

    /// Cells overlapped by an AABB, or `None` if it spans too many.
    fn cells_for(&self, aabb: &AABB) -> Option<Vec<CellCoord>> {
        let (min_col, min_row) = self.cell_of(aabb.min);
        let (max_col, max_row) = self.cell_of(aabb.max);
        let cols = i64::from(max_col) - i64::from(min_col) + 1;
        let rows = i64::from(max_row) - i64::from(min_row) + 1;
        let count = cols.checked_mul(rows)?;
        if count > MAX_CELLS_PER_BODY {
            return None;
        }

        let mut coords = Vec::with_capacity(count as usize);
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                coords.push((col, row));
            }
        }
        Some(coords)
    }

    // --- Public API Methods ---

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn body_count(&self) -> usize {
        self.body_cells.len() + self.oversized.len()
    }

    pub fn contains(&self, handle: usize) -> bool {
        self.body_cells.contains_key(&handle) || self.oversized.contains(&handle)
    }

    /// Removes every body from the grid.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.body_cells.clear();
        self.oversized.clear();
    }

    /// Inserts a body's AABB. Re-inserting an existing handle moves it.
    pub fn insert_body(&mut self, handle: usize, aabb: &AABB) {
        if self.contains(handle) {
            self.remove_body(handle);
        }
        match self.cells_for(aabb) {
            Some(coords) => {
                for coord in &coords {
                    self.cells.entry(*coord).or_default().push(handle);
                }
                self.body_cells.insert(handle, coords);
            }
            None => self.oversized.push(handle),
        }
    }

    /// Re-indexes a body whose AABB changed. Cheap when it stays in the same cells.
    pub fn update_body(&mut self, handle: usize, aabb: &AABB) {
        if let (Some(current), Some(next)) = (self.body_cells.get(&handle), self.cells_for(aabb)) {
            if *current == next {
                return;
            }
        }
        self.insert_body(handle, aabb);
    }

    /// Removes a body; returns false if it was not indexed.
    pub fn remove_body(&mut self, handle: usize) -> bool {
        if let Some(index) = self.oversized.iter().position(|h| *h == handle) {
            self.oversized.swap_remove(index);
            return true;
        }
        let Some(coords) = self.body_cells.remove(&handle) else {
            return false;
        };
        for coord in coords {
            if let Some(bucket) = self.cells.get_mut(&coord) {
                bucket.retain(|h| *h != handle);
                if bucket.is_empty() {
                    self.cells.remove(&coord);
                }
            }
        }
        true
    }

    /// Every pair of handles sharing at least one cell, as `(low, high)`,
    /// sorted and without duplicates.
    pub fn potential_collision_pairs(&self) -> Vec<(usize, usize)> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for bucket in self.cells.values() {
            if bucket.len() < 2 {
                continue;
            }
            for (i, &a) in bucket.iter().enumerate() {
                for &b in &bucket[i + 1..] {
                    if a != b {
                        seen.insert((a.min(b), a.max(b)));
                    }
                }
            }
        }

        // Oversized bodies are candidates against everything.
        for &big in &self.oversized {
            for &other in self.body_cells.keys().chain(self.oversized.iter()) {
                if big != other {
                    seen.insert((big.min(other), big.max(other)));
                }
            }
        }

        let mut pairs: Vec<(usize, usize)> = seen.into_iter().collect();
        pairs.sort_unstable();
        pairs
    }

    /// Handles whose cells intersect the cells covered by `aabb`, sorted.
    /// A superset of the bodies actually overlapping it.
    pub fn query_aabb(&self, aabb: &AABB) -> Vec<usize> {
        let mut found: HashSet<usize> = self.oversized.iter().copied().collect();
        match self.cells_for(aabb) {
            Some(coords) => {
                for coord in coords {
                    if let Some(bucket) = self.cells.get(&coord) {
                        found.extend(bucket.iter().copied());
                    }
                }
            }
            None => found.extend(self.body_cells.keys().copied()),
        }
        let mut handles: Vec<usize> = found.into_iter().collect();
        handles.sort_unstable();
        handles
    }
}
