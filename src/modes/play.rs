use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::game::{GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Render at 30 FPS independently of the game tick rate
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Interactive terminal mode: the autopilot drives unless the player takes over
pub struct PlayMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    paused: bool,
}

impl PlayMode {
    pub fn new(mut config: GameConfig) -> Self {
        // Leave half of each tick for input and drawing
        if config.planner.time_budget_ms.is_none() {
            config.planner.time_budget_ms = Some((config.tick_interval_ms / 2).max(1));
        }

        Self {
            engine: GameEngine::new(config),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            paused: false,
        }
    }

    pub async fn run(&mut self) -> Result<GameMetrics> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;
        result?;

        info!(
            games = self.metrics.games_played,
            high_score = self.metrics.high_score,
            "play session ended"
        );
        Ok(std::mem::take(&mut self.metrics))
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(self.engine.config().tick_interval());
        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.update_game();
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.engine, &self.metrics, self.paused);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return;
        }

        self.apply(self.input_handler.handle_key_event(key));
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Steer(direction) => self.engine.key_handler([direction]),
            KeyAction::ToggleAutopilot => {
                let enabled = !self.engine.autopilot();
                self.engine.set_autopilot(enabled);
                info!(enabled, "autopilot toggled");
            }
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Restart => self.reset_game(),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        let result = self.engine.tick();
        self.metrics.record_step(&result, self.engine.score());
    }

    fn reset_game(&mut self) {
        if self.engine.is_alive() && self.engine.steps() > 0 {
            self.metrics.on_game_over(self.engine.score());
        }
        self.engine.restart();
        self.metrics.on_game_start();
        self.paused = false;
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::PlannerConfig;
    use crate::game::Direction;

    fn mode() -> PlayMode {
        PlayMode::new(GameConfig::new(10).with_seed(4))
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert!(mode.engine.is_alive());
        assert!(mode.engine.autopilot());
        assert_eq!(mode.engine.score(), 0);
        assert!(!mode.paused);
    }

    #[test]
    fn test_planner_time_budget_follows_tick() {
        let mode = mode();
        assert_eq!(mode.engine.config().planner.time_budget_ms, Some(62));

        let config = GameConfig {
            planner: PlannerConfig::default().with_time_budget(10),
            ..GameConfig::new(10)
        };
        let mode = PlayMode::new(config);
        assert_eq!(mode.engine.config().planner.time_budget_ms, Some(10));
    }

    #[test]
    fn test_pause_toggles() {
        let mut mode = mode();
        mode.apply(KeyAction::Pause);
        assert!(mode.paused);
        mode.apply(KeyAction::Pause);
        assert!(!mode.paused);
    }

    #[test]
    fn test_toggle_autopilot() {
        let mut mode = mode();
        mode.apply(KeyAction::ToggleAutopilot);
        assert!(!mode.engine.autopilot());
        mode.apply(KeyAction::ToggleAutopilot);
        assert!(mode.engine.autopilot());
    }

    #[test]
    fn test_steer_in_manual_mode() {
        let mut mode = mode();
        mode.apply(KeyAction::ToggleAutopilot);
        let start = mode.engine.snake().head();

        mode.apply(KeyAction::Steer(Direction::Up));
        mode.update_game();

        assert_eq!(mode.engine.snake().head(), start.moved_in_direction(Direction::Up));
    }

    #[test]
    fn test_game_reset() {
        let mut mode = mode();
        for _ in 0..5 {
            mode.update_game();
        }
        mode.apply(KeyAction::Restart);

        assert!(mode.engine.is_alive());
        assert_eq!(mode.engine.score(), 0);
        assert_eq!(mode.engine.steps(), 0);
        assert_eq!(mode.engine.episode(), 2);
        assert_eq!(mode.metrics.games_played, 1);
    }

    #[test]
    fn test_quit() {
        let mut mode = mode();
        mode.apply(KeyAction::Quit);
        assert!(mode.should_quit);
    }
}
