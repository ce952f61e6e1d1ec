use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::agent::PlannerConfig;

/// Smallest board that leaves room to turn around
pub const MIN_BOARD_SIZE: usize = 3;

/// Errors raised when validating configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board_size must be at least {MIN_BOARD_SIZE}, got {0}")]
    BoardTooSmall(usize),
    #[error("tick_interval_ms must be positive")]
    ZeroTickInterval,
    #[error("planner max_expansions must be at least 1")]
    ZeroExpansionBudget,
    #[error("planner time_budget_ms must be positive when set")]
    ZeroTimeBudget,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per side of the square board
    pub board_size: usize,
    /// Milliseconds between simulation ticks
    pub tick_interval_ms: u64,
    /// Points for eating food
    pub score_increment: u32,
    /// Points lost on every tick without food (score never drops below zero)
    pub score_decrement: u32,
    /// Ticks to hold the final frame before restarting after a game ends
    pub end_game_wait_ticks: u32,
    /// Let the planner steer the snake
    pub autopilot: bool,
    /// Seed for food placement; entropy when unset
    pub seed: Option<u64>,
    /// Search limits
    pub planner: PlannerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 20,
            tick_interval_ms: 125,
            score_increment: 100,
            score_decrement: 1,
            end_game_wait_ticks: 16,
            autopilot: true,
            seed: None,
            planner: PlannerConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board size
    pub fn new(board_size: usize) -> Self {
        Self {
            board_size,
            ..Default::default()
        }
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Create a large board
    pub fn large() -> Self {
        Self::new(30)
    }

    /// Same configuration with a fixed RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall(self.board_size));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.planner.validate()
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Self =
            serde_json::from_str(&json).context("Failed to deserialize config")?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        Ok(())
    }
}
