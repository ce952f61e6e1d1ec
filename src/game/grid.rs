use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move cell by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move cell one step in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// |dx| + |dy|
    pub fn manhattan(&self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four edge-adjacent cells, in `Direction::ALL` order. May be off the board.
    pub fn neighbors(&self) -> [Cell; 4] {
        Direction::ALL.map(|d| self.moved_in_direction(d))
    }
}

/// Bounded square grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Cells per side
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells
    pub fn capacity(&self) -> usize {
        self.size * self.size
    }

    /// Check if a cell is within the grid bounds
    pub fn in_bounds(&self, cell: Cell) -> bool {
        let size = self.size as i32;
        cell.x >= 0 && cell.x < size && cell.y >= 0 && cell.y < size
    }

    /// Row-major index of an in-bounds cell
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.y as usize * self.size + cell.x as usize)
        } else {
            None
        }
    }

    pub fn center(&self) -> Cell {
        let mid = (self.size / 2) as i32;
        Cell::new(mid, mid)
    }

    /// Iterate all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let size = self.size as i32;
        (0..size).flat_map(move |y| (0..size).map(move |x| Cell::new(x, y)))
    }
}

/// Dense membership bitmap over a grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    grid: Grid,
    bits: Vec<bool>,
    count: usize,
}

impl OccupancyGrid {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            bits: vec![false; grid.capacity()],
            count: 0,
        }
    }

    /// Build a bitmap covering every in-bounds cell of the iterator
    pub fn from_cells(grid: Grid, cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut occupancy = Self::new(grid);
        for cell in cells {
            occupancy.insert(cell);
        }
        occupancy
    }

    /// Mark a cell; out-of-bounds cells are ignored
    pub fn insert(&mut self, cell: Cell) {
        if let Some(idx) = self.grid.index(cell) {
            if !self.bits[idx] {
                self.bits[idx] = true;
                self.count += 1;
            }
        }
    }

    pub fn remove(&mut self, cell: Cell) {
        if let Some(idx) = self.grid.index(cell) {
            if self.bits[idx] {
                self.bits[idx] = false;
                self.count -= 1;
            }
        }
    }

    /// Out-of-bounds cells are never contained
    pub fn contains(&self, cell: Cell) -> bool {
        self.grid.index(cell).is_some_and(|idx| self.bits[idx])
    }

    pub fn clear(&mut self) {
        self.bits.fill(false);
        self.count = 0;
    }

    /// Number of marked cells
    pub fn count(&self) -> usize {
        self.count
    }

    /// True if any edge-adjacent cell is marked
    pub fn touches(&self, cell: Cell) -> bool {
        cell.neighbors().iter().any(|&n| self.contains(n))
    }
}
