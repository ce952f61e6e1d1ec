//! Planner search limits

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::ConfigError;

/// Limits for a single planning call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum distinct (cell, step) states expanded before giving up
    ///
    /// Deterministic: the same snapshot always stops at the same node.
    ///
    /// Default: 200_000
    pub max_expansions: usize,
    /// Wall-clock cap for one call in milliseconds; unset means no time limit
    ///
    /// The interactive mode sizes this from the tick interval. Results depend on
    /// machine speed once it binds.
    pub time_budget_ms: Option<u64>,
}

impl PlannerConfig {
    pub fn new(max_expansions: usize) -> Self {
        Self {
            max_expansions,
            time_budget_ms: None,
        }
    }

    pub fn with_time_budget(mut self, millis: u64) -> Self {
        self.time_budget_ms = Some(millis);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_expansions == 0 {
            return Err(ConfigError::ZeroExpansionBudget);
        }
        if self.time_budget_ms == Some(0) {
            return Err(ConfigError::ZeroTimeBudget);
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(200_000)
    }
}
