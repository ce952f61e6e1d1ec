use super::direction::Direction;
use super::grid::{Cell, Grid, OccupancyGrid};
use crate::agent::SearchSnapshot;

/// Direction a fresh snake starts moving in
pub const START_DIRECTION: Direction = Direction::Left;

/// The snake in the game
///
/// Body cells live in a fixed-capacity ring buffer sized to the board, so growing
/// and shifting never reallocate. The live run goes from `tail_idx` to `head_idx`,
/// both inclusive and taken modulo capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    grid: Grid,
    ring: Vec<Cell>,
    head_idx: usize,
    tail_idx: usize,
    len: usize,
    direction: Direction,
    occupancy: OccupancyGrid,
}

impl Snake {
    /// Create a length-1 snake in the middle of the grid
    pub fn new(grid: Grid) -> Self {
        let capacity = grid.capacity().max(1);
        let mut snake = Self {
            grid,
            ring: vec![grid.center(); capacity],
            head_idx: 0,
            tail_idx: 0,
            len: 1,
            direction: START_DIRECTION,
            occupancy: OccupancyGrid::new(grid),
        };
        snake.reset();
        snake
    }

    /// Create a snake from explicit cells ordered tail first, head last
    ///
    /// Returns `None` if `cells` is empty or longer than the board.
    pub fn from_cells(grid: Grid, cells: &[Cell], direction: Direction) -> Option<Self> {
        let capacity = grid.capacity();
        if cells.is_empty() || cells.len() > capacity {
            return None;
        }

        let mut ring = vec![cells[0]; capacity];
        ring[..cells.len()].copy_from_slice(cells);

        Some(Self {
            grid,
            ring,
            head_idx: cells.len() - 1,
            tail_idx: 0,
            len: cells.len(),
            direction,
            occupancy: OccupancyGrid::from_cells(grid, cells.iter().copied()),
        })
    }

    /// Restore a length-1 snake at the centre, moving left
    pub fn reset(&mut self) {
        let start = self.grid.center();
        self.ring[0] = start;
        self.head_idx = 0;
        self.tail_idx = 0;
        self.len = 1;
        self.direction = START_DIRECTION;
        self.occupancy.clear();
        self.occupancy.insert(start);
    }

    /// Get the head position
    pub fn head(&self) -> Cell {
        self.ring[self.head_idx]
    }

    /// Get the tail position (oldest live segment)
    pub fn tail(&self) -> Cell {
        self.ring[self.tail_idx]
    }

    /// Cell the head would enter on the next advance
    pub fn next_head(&self) -> Cell {
        self.head().moved_in_direction(self.direction)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Request a new heading; a 180-degree reversal is ignored.
    pub fn change_direction(&mut self, requested: Direction) {
        if !self.direction.is_opposite(requested) {
            self.direction = requested;
        }
    }

    /// Step forward one cell, growing if the new head lands on `food`.
    ///
    /// Returns whether food was eaten. Bounds and self-collision are the
    /// caller's business.
    pub fn advance(&mut self, food: Cell) -> bool {
        let new_head = self.next_head();
        let ate_food = new_head == food;

        // Evict first so a head entering the vacated tail cell stays marked.
        if !ate_food {
            self.evict_tail();
        }
        self.push_head(new_head);

        ate_food
    }

    fn push_head(&mut self, cell: Cell) {
        debug_assert!(self.len < self.ring.len(), "snake ring buffer overflow");
        self.head_idx = (self.head_idx + 1) % self.ring.len();
        self.ring[self.head_idx] = cell;
        self.len += 1;
        self.occupancy.insert(cell);
    }

    fn evict_tail(&mut self) {
        let cell = self.ring[self.tail_idx];
        self.tail_idx = (self.tail_idx + 1) % self.ring.len();
        self.len -= 1;
        self.occupancy.remove(cell);
    }

    /// All live cells from tail to head
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let capacity = self.ring.len();
        (0..self.len).map(move |i| self.ring[(self.tail_idx + i) % capacity])
    }

    /// Body cells from tail to neck, head excluded
    pub fn body_cells(&self) -> Vec<Cell> {
        self.cells().take(self.len - 1).collect()
    }

    /// Fast membership view over every live cell, head included
    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    /// Check if a cell is covered by any live segment
    pub fn occupies(&self, cell: Cell) -> bool {
        self.occupancy.contains(cell)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.len
    }

    /// Never true for a constructed snake
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The snake covers the whole board
    pub fn is_win(&self) -> bool {
        self.len == self.grid.capacity()
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Immutable copy of everything the planner needs
    pub fn snapshot(&self, goal: Cell) -> SearchSnapshot {
        SearchSnapshot {
            grid: self.grid,
            head: self.head(),
            direction: self.direction,
            body: self.cells().collect(),
            length: self.len,
            goal,
        }
    }
}
