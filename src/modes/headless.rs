//! Run the autopilot without a terminal UI
//!
//! Episodes are played back to back as fast as the planner allows. An episode ends on
//! the first terminating tick or after `max_ticks` moves, whichever comes first; the
//! end-of-game countdown is skipped.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::game::{CollisionType, GameConfig, GameEngine};
use crate::metrics::{GameMetrics, MetricsSummary};

/// How long a headless session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessConfig {
    pub episodes: u32,
    /// Per-episode tick cap
    pub max_ticks: u32,
}

impl HeadlessConfig {
    pub fn new(episodes: u32, max_ticks: u32) -> Self {
        Self {
            episodes,
            max_ticks,
        }
    }
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self::new(10, 10_000)
    }
}

/// How a single headless episode finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeEnd {
    Won,
    Wall,
    SelfCollision,
    /// Hit the tick cap while still alive
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpisodeReport {
    pub episode: u32,
    pub score: u32,
    pub length: usize,
    pub ticks: u32,
    pub end: EpisodeEnd,
}

pub struct HeadlessMode {
    engine: GameEngine,
    metrics: GameMetrics,
    config: HeadlessConfig,
    reports: Vec<EpisodeReport>,
}

impl HeadlessMode {
    pub fn new(game_config: GameConfig, config: HeadlessConfig) -> Self {
        let mut engine = GameEngine::new(game_config);
        engine.set_autopilot(true);

        Self {
            engine,
            metrics: GameMetrics::new(),
            config,
            reports: Vec::new(),
        }
    }

    /// Play every episode and return the session summary
    pub fn run(&mut self) -> Result<MetricsSummary> {
        info!(
            episodes = self.config.episodes,
            max_ticks = self.config.max_ticks,
            board_size = self.engine.grid().size(),
            "headless session started"
        );

        for n in 0..self.config.episodes {
            if n > 0 {
                self.engine.restart();
                self.metrics.on_game_start();
            }

            let report = self.run_episode();
            info!(
                episode = report.episode,
                score = report.score,
                length = report.length,
                ticks = report.ticks,
                end = ?report.end,
                "episode finished"
            );
            self.reports.push(report);
        }

        let summary = self.metrics.summary();
        info!(
            games = summary.games_played,
            won = summary.games_won,
            high_score = summary.high_score,
            mean_score = summary.mean_score,
            "headless session finished"
        );
        Ok(summary)
    }

    fn run_episode(&mut self) -> EpisodeReport {
        let mut ticks = 0;
        let mut end = EpisodeEnd::TickLimit;

        while ticks < self.config.max_ticks {
            let result = self.engine.tick();
            ticks += 1;
            self.metrics.record_step(&result, self.engine.score());

            if result.terminated {
                end = match result.info.collision_type {
                    Some(CollisionType::Wall) => EpisodeEnd::Wall,
                    Some(CollisionType::SelfCollision) => EpisodeEnd::SelfCollision,
                    None => EpisodeEnd::Won,
                };
                break;
            }
        }

        if end == EpisodeEnd::TickLimit {
            self.metrics.on_game_over(self.engine.score());
        }
        self.metrics.update();

        EpisodeReport {
            episode: self.engine.episode(),
            score: self.engine.score(),
            length: self.engine.snake().len(),
            ticks,
            end,
        }
    }

    pub fn reports(&self) -> &[EpisodeReport] {
        &self.reports
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }
}
