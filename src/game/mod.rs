//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! It can be driven by the terminal UI, the headless runner or tests alike.

pub mod config;
pub mod direction;
pub mod engine;
pub mod grid;
pub mod snake;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use direction::Direction;
pub use engine::{CollisionType, GameEngine, GameStatus, PlanReport, StepInfo, StepResult};
pub use grid::{Cell, Grid, OccupancyGrid};
pub use snake::Snake;
