use std::collections::HashSet;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Cell, CollisionType, GameEngine, GameStatus};
use crate::metrics::GameMetrics;

/// What a single grid cell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Head,
    Body,
    Food,
    Route,
    Empty,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        engine: &GameEngine,
        metrics: &GameMetrics,
        paused: bool,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], engine, metrics, paused);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match engine.status() {
            GameStatus::Playing => {
                let grid = self.render_grid(game_area, engine);
                frame.render_widget(grid, game_area);
            }
            status => {
                let game_over = self.render_game_over(game_area, engine, status);
                frame.render_widget(game_over, game_area);
            }
        }

        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    /// Classify a cell for drawing; the route is only shown where nothing else is
    pub fn classify(engine: &GameEngine, route: &HashSet<Cell>, cell: Cell) -> CellKind {
        let snake = engine.snake();
        if cell == snake.head() {
            CellKind::Head
        } else if snake.occupies(cell) {
            CellKind::Body
        } else if engine.goal() == Some(cell) {
            CellKind::Food
        } else if route.contains(&cell) {
            CellKind::Route
        } else {
            CellKind::Empty
        }
    }

    fn render_grid(&self, _area: Rect, engine: &GameEngine) -> Paragraph<'_> {
        let route: HashSet<Cell> = engine.planned_route().into_iter().collect();
        let size = engine.grid().size() as i32;
        let mut lines = Vec::new();

        for y in 0..size {
            let mut spans = Vec::new();

            for x in 0..size {
                let cell = match Self::classify(engine, &route, Cell::new(x, y)) {
                    CellKind::Head => Span::styled(
                        format!("{} ", engine.snake().direction().arrow()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    CellKind::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
                    CellKind::Food => Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    CellKind::Route => Span::styled("· ", Style::default().fg(Color::Yellow)),
                    CellKind::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        engine: &GameEngine,
        metrics: &GameMetrics,
        paused: bool,
    ) -> Paragraph<'_> {
        let pilot = if engine.autopilot() { "A*" } else { "manual" };
        let mut spans = vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                engine.score().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Max: ", Style::default().fg(Color::Yellow)),
            Span::styled(engine.max_score().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Length: ", Style::default().fg(Color::Yellow)),
            Span::styled(engine.snake().len().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Pilot: ", Style::default().fg(Color::Yellow)),
            Span::styled(pilot, Style::default().fg(Color::Cyan)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ];
        if paused {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(
        &self,
        _area: Rect,
        engine: &GameEngine,
        status: GameStatus,
    ) -> Paragraph<'_> {
        let (headline, reason) = match status {
            GameStatus::Won { .. } => ("BOARD CLEARED", "the snake filled the board"),
            GameStatus::GameOver {
                collision: CollisionType::Wall,
                ..
            } => ("GAME OVER", "hit the wall"),
            GameStatus::GameOver {
                collision: CollisionType::SelfCollision,
                ..
            } => ("GAME OVER", "ran into itself"),
            GameStatus::Playing => ("", ""),
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(reason, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    engine.score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Max Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(engine.max_score().to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "A new game starts shortly",
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to steer | "),
            Span::styled("P", Style::default().fg(Color::Cyan)),
            Span::raw(" autopilot | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
