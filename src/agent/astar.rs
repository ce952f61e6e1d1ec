//! Best-first search from the snake's head to the food
//!
//! The obstacle set changes as the path grows: every move the real snake makes
//! also drops its tail, so body cells near the tail stop being obstacles once the
//! path has taken enough steps. A body cell at window position `i` (tail = 0)
//! blocks step `k` while `i >= k - 1`, i.e. collisions are judged against the
//! body as it stands before that move's tail eviction. Cells the path itself
//! already visited always block.
//!
//! Since the obstacles depend only on the step count, the search runs over
//! (cell, step) states and expands each state once, through whichever path pops
//! it first.

use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;

use tracing::{debug, trace};

use super::{Plan, PlannerConfig, SearchError, SearchFailure, SearchNode, SearchSnapshot};
use crate::game::{Cell, Direction, Grid, OccupancyGrid};

/// Expansions between clock reads when a time budget is set
const CLOCK_STRIDE: usize = 256;

/// A* planner over immutable snapshots
#[derive(Debug, Clone, Default)]
pub struct PathfindingEngine {
    config: PlannerConfig,
}

impl PathfindingEngine {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a route, or an empty plan if there is none
    pub fn find_path(&self, snapshot: &SearchSnapshot) -> Plan {
        self.plan(snapshot).unwrap_or_default()
    }

    /// Search for a move sequence from the snapshot's head to its goal
    pub fn plan(&self, snapshot: &SearchSnapshot) -> Result<Plan, SearchError> {
        self.search(snapshot).map_err(|failure| failure.error)
    }

    /// Like [`plan`](Self::plan), but a search cut short by its budget still hands
    /// back the safe moves leading to the deepest state it reached
    pub fn search(&self, snapshot: &SearchSnapshot) -> Result<Plan, SearchFailure> {
        let obstacles = BodyObstacles::new(snapshot);
        let grid = snapshot.grid;
        let goal = snapshot.goal;
        let step_limit = grid.capacity();
        let deadline = self
            .config
            .time_budget()
            .map(|budget| Instant::now() + budget);

        let mut frontier = BinaryHeap::new();
        frontier.push(SearchNode::root(snapshot.head, snapshot.direction, goal));
        let mut closed: HashSet<(usize, usize)> = HashSet::new();
        let mut deepest: Option<SearchNode> = None;
        let mut seq = 0u64;
        let mut expanded = 0usize;

        while let Some(node) = frontier.pop() {
            // Unreachable while revisits are pruned; kept as the hard bound on path length.
            if node.path().len() > step_limit {
                continue;
            }

            let position = node.position();
            if node.steps() > 0 && self.collides(&node, &obstacles, grid) {
                trace!(?position, steps = node.steps(), "pruned colliding node");
                continue;
            }

            let Some(idx) = grid.index(position) else {
                continue;
            };
            if !closed.insert((idx, node.steps())) {
                continue;
            }

            if self.out_of_budget(expanded, deadline) {
                debug!(expanded, frontier = frontier.len(), "planner budget exhausted");
                return Err(SearchFailure {
                    error: SearchError::BudgetExhausted { expanded },
                    fallback: deepest.map(SearchNode::into_plan).unwrap_or_default(),
                });
            }
            expanded += 1;

            if position == goal {
                debug!(expanded, moves = node.steps(), "planner reached goal");
                return Ok(node.into_plan());
            }

            for direction in Direction::ALL {
                if direction.is_opposite(node.last_direction()) {
                    continue;
                }
                let next = position.moved_in_direction(direction);
                if !grid.in_bounds(next) {
                    continue;
                }
                seq += 1;
                frontier.push(node.child(direction, goal, obstacles.touches(next), seq));
            }

            if deepest.as_ref().map_or(node.steps() > 0, |d| node.steps() > d.steps()) {
                deepest = Some(node);
            }
        }

        debug!(expanded, "planner frontier exhausted");
        Err(SearchFailure {
            error: SearchError::NoPath { expanded },
            fallback: Plan::new(),
        })
    }

    fn out_of_budget(&self, expanded: usize, deadline: Option<Instant>) -> bool {
        if expanded >= self.config.max_expansions {
            return true;
        }
        match deadline {
            Some(deadline) => expanded % CLOCK_STRIDE == 0 && Instant::now() >= deadline,
            None => false,
        }
    }

    fn collides(&self, node: &SearchNode, obstacles: &BodyObstacles, grid: Grid) -> bool {
        let position = node.position();
        !grid.in_bounds(position)
            || obstacles.blocks(position, node.steps())
            || node.revisits(position)
    }
}

/// Snapshot body cells with the step at which each stops blocking
struct BodyObstacles {
    grid: Grid,
    /// Window position of the newest occurrence of each cell
    window_index: Vec<Option<usize>>,
    /// Body cells excluding the head, for the hugging tie-break
    hug: OccupancyGrid,
}

impl BodyObstacles {
    fn new(snapshot: &SearchSnapshot) -> Self {
        let grid = snapshot.grid;
        let length = snapshot.length.min(snapshot.body.len());
        let window = &snapshot.body[snapshot.body.len() - length..];

        let mut window_index = vec![None; grid.capacity()];
        for (i, &cell) in window.iter().enumerate() {
            if let Some(idx) = grid.index(cell) {
                window_index[idx] = Some(i);
            }
        }

        let neck_end = window.len().saturating_sub(1);
        let hug = OccupancyGrid::from_cells(grid, window[..neck_end].iter().copied());

        Self {
            grid,
            window_index,
            hug,
        }
    }

    /// Does the body still cover `cell` when the path takes its `step`-th move?
    fn blocks(&self, cell: Cell, step: usize) -> bool {
        self.grid
            .index(cell)
            .and_then(|idx| self.window_index[idx])
            .is_some_and(|i| i + 1 >= step)
    }

    fn touches(&self, cell: Cell) -> bool {
        self.hug.touches(cell)
    }
}
