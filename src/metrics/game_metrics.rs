use serde::Serialize;
use std::time::{Duration, Instant};

use crate::game::StepResult;

/// Session counters fed from every tick
pub struct GameMetrics {
    pub session_start: Instant,
    /// Start of the current game
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    pub games_won: u32,
    pub food_eaten: u32,
    pub plans_found: u32,
    pub plans_failed: u32,
    /// Final score of every finished game, oldest first
    pub episode_scores: Vec<u32>,
}

/// Serializable snapshot of the counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub games_played: u32,
    pub games_won: u32,
    pub high_score: u32,
    pub mean_score: f64,
    pub food_eaten: u32,
    pub plans_found: u32,
    pub plans_failed: u32,
    /// Wall time since the session started
    pub elapsed_secs: f64,
}

impl GameMetrics {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            session_start: now,
            start_time: now,
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            games_won: 0,
            food_eaten: 0,
            plans_found: 0,
            plans_failed: 0,
            episode_scores: Vec::new(),
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        self.episode_scores.push(final_score);
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    /// Fold one tick into the counters; `score` is the engine's score after the tick
    pub fn record_step(&mut self, result: &StepResult, score: u32) {
        if result.info.ate_food {
            self.food_eaten += 1;
        }
        match result.info.plan {
            Some(Ok(_)) => self.plans_found += 1,
            Some(Err(_)) => self.plans_failed += 1,
            None => {}
        }
        if result.won {
            self.games_won += 1;
        }
        if result.terminated && (result.won || result.info.collision_type.is_some()) {
            self.on_game_over(score);
        }
        if result.restarted {
            self.on_game_start();
        }
    }

    pub fn mean_score(&self) -> f64 {
        if self.episode_scores.is_empty() {
            return 0.0;
        }
        let total: u64 = self.episode_scores.iter().map(|&s| u64::from(s)).sum();
        total as f64 / self.episode_scores.len() as f64
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            games_played: self.games_played,
            games_won: self.games_won,
            high_score: self.high_score,
            mean_score: self.mean_score(),
            food_eaten: self.food_eaten,
            plans_found: self.plans_found,
            plans_failed: self.plans_failed,
            elapsed_secs: self.session_start.elapsed().as_secs_f64(),
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
