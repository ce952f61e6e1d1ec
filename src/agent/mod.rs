//! A* autopilot for the snake
//!
//! Provides:
//! - Immutable search snapshots taken from the live snake
//! - Search nodes with a deterministic frontier ordering
//! - The best-first search that turns a snapshot into a move plan

pub mod astar;
pub mod config;
pub mod node;

use std::collections::VecDeque;
use thiserror::Error;

use crate::game::{Cell, Direction, Grid};

pub use astar::PathfindingEngine;
pub use config::PlannerConfig;
pub use node::SearchNode;

/// Moves from the head to the goal, consumed one per tick. Empty means no path.
pub type Plan = VecDeque<Direction>;

/// Everything the planner may look at, copied out of the live game
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub grid: Grid,
    pub head: Cell,
    /// Current heading; the first move may not reverse it
    pub direction: Direction,
    /// Live cells ordered tail first, head last
    pub body: Vec<Cell>,
    /// Snake length; only the last `length` body cells are obstacles
    pub length: usize,
    pub goal: Cell,
}

/// Why a planning call produced no plan
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no path to goal after expanding {expanded} nodes")]
    NoPath { expanded: usize },
    #[error("search budget exhausted after {expanded} nodes")]
    BudgetExhausted { expanded: usize },
}

/// A planning call that did not reach the goal
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFailure {
    pub error: SearchError,
    /// Safe moves toward the deepest state reached; only filled when the budget ran out
    pub fallback: Plan,
}
