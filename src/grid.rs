//! Cell occupancy tracking for a level under construction.

use std::collections::{HashMap, HashSet};

use crate::Cell;

/// Width x height board with per-cell occupancy and a cell -> owning-arrow
/// index. Only `mark_occupied` mutates; growth logic gates every candidate
/// cell through `is_valid_and_free`.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    occupied: HashSet<Cell>,
    cell_to_arrow: HashMap<Cell, String>,
    void_cells: HashSet<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_voids(width, height, &[])
    }

    /// Board with pre-excluded cells. Void cells are never free and never
    /// owned by an arrow; rays pass over them.
    pub fn with_voids(width: i32, height: i32, voids: &[Cell]) -> Self {
        Self {
            width,
            height,
            occupied: HashSet::new(),
            cell_to_arrow: HashMap::new(),
            void_cells: voids.iter().copied().collect(),
        }
    }

    pub fn is_valid(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.occupied.contains(&cell)
    }

    pub fn is_void(&self, cell: Cell) -> bool {
        self.void_cells.contains(&cell)
    }

    pub fn is_valid_and_free(&self, cell: Cell) -> bool {
        self.is_valid(cell) && !self.is_occupied(cell) && !self.is_void(cell)
    }

    pub fn mark_occupied(&mut self, cell: Cell, arrow_id: &str) {
        self.occupied.insert(cell);
        self.cell_to_arrow.insert(cell, arrow_id.to_string());
    }

    /// Id of the arrow covering `cell`, if any.
    pub fn owner(&self, cell: Cell) -> Option<&str> {
        self.cell_to_arrow.get(&cell).map(String::as_str)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn void_count(&self) -> usize {
        self.void_cells.len()
    }

    /// Manhattan distance from the board center.
    pub fn distance_from_center(&self, cell: Cell) -> i32 {
        let cx = self.width / 2;
        let cy = self.height / 2;
        (cell.x - cx).abs() + (cell.y - cy).abs()
    }
}
