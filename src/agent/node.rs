//! Search nodes and their frontier ordering

use std::cmp::Ordering;

use super::Plan;
use crate::game::{Cell, Direction};

/// One candidate path in the frontier
///
/// Nodes are never mutated: expanding a node derives children that own copies
/// of the parent's path and direction list. The first entry of `directions` is
/// the heading the snake already had when planning started and is not part of
/// the resulting plan.
#[derive(Debug, Clone)]
pub struct SearchNode {
    path: Vec<Cell>,
    directions: Vec<Direction>,
    g: u32,
    h: u32,
    hugs_body: bool,
    seq: u64,
}

impl SearchNode {
    /// Node sitting on the head with no moves taken
    pub fn root(head: Cell, direction: Direction, goal: Cell) -> Self {
        Self {
            path: vec![head],
            directions: vec![direction],
            g: 0,
            h: head.manhattan(goal),
            hugs_body: false,
            seq: 0,
        }
    }

    /// Derive the node reached by one more move in `direction`
    pub fn child(&self, direction: Direction, goal: Cell, hugs_body: bool, seq: u64) -> Self {
        let next = self.position().moved_in_direction(direction);

        let mut path = self.path.clone();
        path.push(next);
        let mut directions = self.directions.clone();
        directions.push(direction);

        Self {
            path,
            directions,
            g: self.g + 1,
            h: next.manhattan(goal),
            hugs_body,
            seq,
        }
    }

    /// Cell at the end of the path
    pub fn position(&self) -> Cell {
        self.path[self.path.len() - 1]
    }

    /// Direction of the last move (the seed heading for the root)
    pub fn last_direction(&self) -> Direction {
        self.directions[self.directions.len() - 1]
    }

    /// Moves taken since the head
    pub fn steps(&self) -> usize {
        self.g as usize
    }

    /// Cells in the path, head included
    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn f(&self) -> u32 {
        self.g + self.h
    }

    pub fn hugs_body(&self) -> bool {
        self.hugs_body
    }

    /// True if `cell` appears earlier in this node's own path
    pub fn revisits(&self, cell: Cell) -> bool {
        self.path[..self.path.len() - 1].contains(&cell)
    }

    /// Moves taken, without the seed heading
    pub fn into_plan(self) -> Plan {
        self.directions.into_iter().skip(1).collect()
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    /// `BinaryHeap` pops the greatest element, so the preferred node compares greater:
    /// lower f, then body-hugging, then `Up < Down < Left < Right` on the last move,
    /// then deeper, then inserted earlier.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f()
            .cmp(&self.f())
            .then_with(|| self.hugs_body.cmp(&other.hugs_body))
            .then_with(|| other.last_direction().cmp(&self.last_direction()))
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
