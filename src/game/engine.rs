use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::{
    config::GameConfig,
    direction::Direction,
    grid::{Cell, Grid},
    snake::Snake,
};
use crate::agent::{PathfindingEngine, Plan, SearchError};

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Where the current episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Crashed; restarts once `wait_remaining` reaches zero
    GameOver {
        collision: CollisionType,
        wait_remaining: u32,
    },
    /// Filled the board; restarts once `wait_remaining` reaches zero
    Won { wait_remaining: u32 },
}

/// Outcome of a planning call made during a tick: moves planned, or why none
pub type PlanReport = Result<usize, SearchError>;

/// Information about a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// Set when the planner ran this tick
    pub plan: Option<PlanReport>,
}

/// Result of a game tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// The episode ended this tick
    pub terminated: bool,
    /// The snake filled the board this tick
    pub won: bool,
    /// A new episode started this tick
    pub restarted: bool,
    /// Additional information about the tick
    pub info: StepInfo,
}

/// Owns the whole simulation and advances it one tick at a time
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    snake: Snake,
    goal: Option<Cell>,
    /// Moves from the last planning call, one consumed per tick
    plan: Plan,
    /// Directions queued by the player, consumed before the plan
    input: VecDeque<Direction>,
    planner: PathfindingEngine,
    rng: StdRng,
    autopilot: bool,
    needs_replan: bool,
    score: u32,
    max_score: u32,
    status: GameStatus,
    steps: u32,
    episode: u32,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        let grid = Grid::new(config.board_size);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            grid,
            snake: Snake::new(grid),
            goal: None,
            plan: Plan::new(),
            input: VecDeque::new(),
            planner: PathfindingEngine::new(config.planner),
            rng,
            autopilot: config.autopilot,
            needs_replan: false,
            score: 0,
            max_score: 0,
            status: GameStatus::Playing,
            steps: 0,
            episode: 1,
            config,
        }
    }

    /// Start a new episode; the max score survives
    pub fn restart(&mut self) {
        self.snake.reset();
        self.goal = None;
        self.plan.clear();
        self.input.clear();
        self.needs_replan = false;
        self.score = 0;
        self.steps = 0;
        self.status = GameStatus::Playing;
        self.episode += 1;
        info!(episode = self.episode, max_score = self.max_score, "episode started");
    }

    /// Queue player directions for the coming ticks
    pub fn key_handler(&mut self, events: impl IntoIterator<Item = Direction>) {
        self.input.extend(events);
    }

    /// Turn the planner on or off
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
        self.plan.clear();
        self.needs_replan = enabled;
    }

    /// Execute one tick of the game
    pub fn tick(&mut self) -> StepResult {
        if self.status != GameStatus::Playing {
            return self.count_down();
        }

        let mut result = StepResult::default();

        let goal = match self.goal {
            Some(goal) => goal,
            None => match self.spawn_goal() {
                Some(goal) => {
                    result.info.plan = self.replan_if_enabled();
                    goal
                }
                None => return self.win(result),
            },
        };

        self.resolve_direction();

        // Judge against the body as it stands before the tail moves.
        let next = self.snake.next_head();
        if let Some(collision) = self.check_collision(next) {
            self.status = GameStatus::GameOver {
                collision,
                wait_remaining: self.config.end_game_wait_ticks,
            };
            self.max_score = self.max_score.max(self.score);
            info!(
                episode = self.episode,
                score = self.score,
                length = self.snake.len(),
                ?collision,
                "game over"
            );
            result.terminated = true;
            result.info.collision_type = Some(collision);
            return result;
        }

        let ate_food = self.snake.advance(goal);
        self.steps += 1;
        result.info.ate_food = ate_food;

        if ate_food {
            self.score += self.config.score_increment;
            self.max_score = self.max_score.max(self.score);
            debug!(score = self.score, length = self.snake.len(), "ate food");

            if self.snake.is_win() {
                return self.win(result);
            }
            match self.spawn_goal() {
                Some(_) => result.info.plan = self.replan_if_enabled(),
                None => return self.win(result),
            }
        } else {
            self.score = self.score.saturating_sub(self.config.score_decrement);
            // Flagged replans wait until any fallback moves are used up.
            if self.needs_replan && self.plan.is_empty() {
                result.info.plan = self.replan_if_enabled();
            }
        }

        result
    }

    /// Pop one player direction, else one planned move
    fn resolve_direction(&mut self) {
        if let Some(direction) = self.input.pop_front() {
            self.snake.change_direction(direction);
            if self.autopilot && !self.plan.is_empty() {
                // The player steered off the planned route.
                self.plan.clear();
                self.needs_replan = true;
            }
        } else if let Some(direction) = self.plan.pop_front() {
            self.snake.change_direction(direction);
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, cell: Cell) -> Option<CollisionType> {
        if !self.grid.in_bounds(cell) {
            return Some(CollisionType::Wall);
        }

        if self.snake.occupies(cell) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Place food on a uniformly chosen free cell, if any is left
    fn spawn_goal(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = self
            .grid
            .cells()
            .filter(|&cell| !self.snake.occupies(cell))
            .collect();

        self.goal = free.choose(&mut self.rng).copied();
        self.goal
    }

    /// Replace the plan with a fresh one (last writer wins)
    fn replan_if_enabled(&mut self) -> Option<PlanReport> {
        self.needs_replan = false;
        if !self.autopilot {
            return None;
        }
        let goal = self.goal?;

        let snapshot = self.snake.snapshot(goal);
        let report = match self.planner.search(&snapshot) {
            Ok(plan) => {
                let moves = plan.len();
                self.plan = plan;
                Ok(moves)
            }
            Err(failure) => {
                self.needs_replan = !failure.fallback.is_empty();
                self.plan = failure.fallback;
                debug!(
                    err = %failure.error,
                    head = ?snapshot.head,
                    ?goal,
                    fallback = self.plan.len(),
                    "no full plan"
                );
                Err(failure.error)
            }
        };
        Some(report)
    }

    fn win(&mut self, mut result: StepResult) -> StepResult {
        self.goal = None;
        self.plan.clear();
        self.max_score = self.max_score.max(self.score);
        self.status = GameStatus::Won {
            wait_remaining: self.config.end_game_wait_ticks,
        };
        info!(episode = self.episode, score = self.score, "board filled");
        result.terminated = true;
        result.won = true;
        result
    }

    /// Hold the final frame, then restart
    fn count_down(&mut self) -> StepResult {
        let remaining = match &mut self.status {
            GameStatus::GameOver { wait_remaining, .. } | GameStatus::Won { wait_remaining } => {
                *wait_remaining = wait_remaining.saturating_sub(1);
                *wait_remaining
            }
            GameStatus::Playing => 0,
        };

        if remaining == 0 {
            self.restart();
            StepResult {
                restarted: true,
                ..Default::default()
            }
        } else {
            StepResult {
                terminated: true,
                ..Default::default()
            }
        }
    }

    /// Cells the remaining plan will visit, in order
    pub fn planned_route(&self) -> Vec<Cell> {
        let mut cell = self.snake.head();
        self.plan
            .iter()
            .map(|&direction| {
                cell = cell.moved_in_direction(direction);
                cell
            })
            .collect()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Current food position
    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Moves made this episode
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// 1-based episode counter
    pub fn episode(&self) -> u32 {
        self.episode
    }
}

#[cfg(test)]
impl GameEngine {
    /// Swap in a hand-built snake and food
    pub(crate) fn set_position(&mut self, snake: Snake, goal: Option<Cell>) {
        self.snake = snake;
        self.goal = goal;
        self.plan.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::PlannerConfig;

    fn new_engine(size: usize) -> GameEngine {
        GameEngine::new(GameConfig::new(size).with_seed(7))
    }

    fn snake(size: usize, coords: &[(i32, i32)], direction: Direction) -> Snake {
        let cells: Vec<Cell> = coords.iter().map(|&(x, y)| Cell::new(x, y)).collect();
        Snake::from_cells(Grid::new(size), &cells, direction).unwrap()
    }

    #[test]
    fn test_new_game() {
        let engine = new_engine(10);

        assert!(engine.is_alive());
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.snake().len(), 1);
        assert_eq!(engine.goal(), None);
        assert_eq!(engine.episode(), 1);
    }

    #[test]
    fn test_first_tick_spawns_food_and_plans() {
        let mut engine = new_engine(10);

        let result = engine.tick();

        let goal = engine.goal().unwrap();
        assert!(!engine.snake().occupies(goal));
        assert!(matches!(result.info.plan, Some(Ok(moves)) if moves > 0));
        assert_eq!(engine.steps(), 1);
    }

    #[test]
    fn test_autopilot_eats_food() {
        let mut engine = new_engine(10);

        let mut eaten = 0;
        for _ in 0..400 {
            let result = engine.tick();
            if result.info.ate_food {
                eaten += 1;
            }
            if result.terminated {
                break;
            }
        }

        assert!(eaten >= 3, "autopilot only ate {eaten} times");
        assert!(engine.max_score() >= 100);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(5, 5)], Direction::Right), Some(Cell::new(9, 9)));

        let result = engine.tick();

        assert!(!result.terminated);
        assert!(!result.info.ate_food);
        assert_eq!(engine.snake().head(), Cell::new(6, 5));
        assert_eq!(engine.snake().len(), 1);
    }

    #[test]
    fn test_food_consumption_and_replan() {
        let mut engine = new_engine(10);
        engine.set_position(snake(10, &[(4, 5), (5, 5)], Direction::Right), Some(Cell::new(6, 5)));

        let result = engine.tick();

        assert!(result.info.ate_food);
        assert_eq!(engine.snake().len(), 3);
        assert_eq!(engine.score(), 100);
        assert_eq!(engine.max_score(), 100);
        assert_ne!(engine.goal(), Some(Cell::new(6, 5)));
        assert!(matches!(result.info.plan, Some(Ok(_))));
        assert_eq!(engine.planned_route().last().copied(), engine.goal());
    }

    #[test]
    fn test_score_decrement_floors_at_zero() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(4, 5), (5, 5)], Direction::Right), Some(Cell::new(6, 5)));

        engine.tick();
        assert_eq!(engine.score(), 100);

        engine.set_position(snake(10, &[(2, 2)], Direction::Right), Some(Cell::new(0, 9)));
        for _ in 0..3 {
            engine.tick();
        }
        assert_eq!(engine.score(), 97);

        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(2, 2)], Direction::Right), Some(Cell::new(0, 9)));
        engine.tick();
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(1, 5), (0, 5)], Direction::Left), Some(Cell::new(5, 5)));

        let result = engine.tick();

        assert!(result.terminated);
        assert!(!engine.is_alive());
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
        assert_eq!(engine.snake().head(), Cell::new(0, 5));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        // Head at (5,6) moving Left, turning Up runs into (5,5).
        engine.set_position(
            snake(10, &[(4, 5), (5, 5), (6, 5), (6, 6), (5, 6)], Direction::Left),
            Some(Cell::new(9, 9)),
        );
        engine.key_handler([Direction::Up]);

        let result = engine.tick();

        assert!(result.terminated);
        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_moving_into_current_tail_is_a_collision() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(
            snake(10, &[(4, 4), (5, 4), (5, 5), (4, 5)], Direction::Left),
            Some(Cell::new(9, 9)),
        );
        engine.key_handler([Direction::Up]);

        let result = engine.tick();

        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(5, 4), (5, 5)], Direction::Down), Some(Cell::new(0, 0)));

        engine.key_handler([Direction::Up]);
        let result = engine.tick();

        assert!(!result.terminated);
        assert_eq!(engine.snake().direction(), Direction::Down);
        assert_eq!(engine.snake().head(), Cell::new(5, 6));
    }

    #[test]
    fn test_input_queue_is_consumed_one_per_tick() {
        let mut engine = new_engine(10);
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(5, 5)], Direction::Left), Some(Cell::new(0, 0)));

        engine.key_handler([Direction::Up, Direction::Right]);
        engine.tick();
        assert_eq!(engine.snake().head(), Cell::new(5, 4));
        engine.tick();
        assert_eq!(engine.snake().head(), Cell::new(6, 4));
        engine.tick();
        assert_eq!(engine.snake().head(), Cell::new(7, 4));
    }

    #[test]
    fn test_restart_after_wait() {
        let mut engine = GameEngine::new(GameConfig {
            end_game_wait_ticks: 3,
            ..GameConfig::new(10).with_seed(3)
        });
        engine.set_autopilot(false);
        engine.set_position(snake(10, &[(4, 5), (5, 5)], Direction::Right), Some(Cell::new(6, 5)));
        engine.tick();
        assert_eq!(engine.max_score(), 100);

        engine.set_position(snake(10, &[(8, 5), (9, 5)], Direction::Right), Some(Cell::new(0, 0)));
        let crash = engine.tick();
        assert!(crash.terminated);

        assert!(engine.tick().terminated);
        assert!(engine.tick().terminated);
        let result = engine.tick();
        assert!(result.restarted);

        assert!(engine.is_alive());
        assert_eq!(engine.snake().len(), 1);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.max_score(), 100);
        assert_eq!(engine.goal(), None);
        assert_eq!(engine.episode(), 2);
    }

    #[test]
    fn test_win_when_board_fills() {
        let mut engine = GameEngine::new(GameConfig {
            end_game_wait_ticks: 1,
            ..GameConfig::new(3).with_seed(5)
        });
        engine.set_autopilot(false);
        // Eight cells covered; the last free cell (2,2) is the food.
        engine.set_position(
            snake(
                3,
                &[(0, 2), (0, 1), (0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (1, 2)],
                Direction::Down,
            ),
            Some(Cell::new(2, 2)),
        );
        engine.key_handler([Direction::Right]);

        let result = engine.tick();

        assert!(result.won);
        assert!(result.terminated);
        assert!(matches!(engine.status(), GameStatus::Won { .. }));
        assert!(engine.tick().restarted);
    }

    #[test]
    fn test_no_path_holds_course() {
        let mut engine = new_engine(5);
        // Trapped in the corner: the planner has nothing to offer.
        engine.set_position(
            snake(5, &[(0, 1), (1, 1), (1, 0), (0, 0)], Direction::Left),
            None,
        );

        let result = engine.tick();

        assert!(matches!(result.info.plan, Some(Err(SearchError::NoPath { .. }))));
        assert!(engine.plan().is_empty());
        assert!(result.terminated);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let run = || {
            let mut engine = new_engine(8);
            let mut heads = Vec::new();
            for _ in 0..60 {
                engine.tick();
                heads.push(engine.snake().head());
            }
            (heads, engine.score())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_player_turn_replaces_partial_plan() {
        let mut engine = new_engine(10);
        engine.set_autopilot(true);
        engine.set_position(
            snake(10, &[(3, 5), (4, 5), (5, 5)], Direction::Right),
            Some(Cell::new(9, 5)),
        );

        let first = engine.tick();
        assert_eq!(first.info.plan, Some(Ok(3)));
        let old_plan = engine.plan().clone();
        assert_eq!(
            old_plan,
            Plan::from(vec![Direction::Right, Direction::Right, Direction::Right])
        );

        engine.key_handler([Direction::Down]);
        let result = engine.tick();

        assert_eq!(engine.snake().head(), Cell::new(6, 6));
        assert_eq!(result.info.plan, Some(Ok(4)));
        assert_ne!(engine.plan(), &old_plan);
        assert_eq!(engine.plan().len(), 4);
        assert_eq!(engine.planned_route().last().copied(), engine.goal());
    }

    #[test]
    fn test_exhausted_budget_follows_fallback() {
        let mut engine = GameEngine::new(GameConfig {
            planner: PlannerConfig::new(3),
            ..GameConfig::new(10).with_seed(7)
        });
        engine.set_autopilot(true);
        engine.set_position(snake(10, &[(5, 5)], Direction::Left), Some(Cell::new(0, 9)));

        let result = engine.tick();

        assert_eq!(engine.snake().head(), Cell::new(4, 5));
        assert_eq!(
            result.info.plan,
            Some(Err(SearchError::BudgetExhausted { expanded: 3 }))
        );
        let fallback = engine.plan().len();
        assert!(fallback > 0);

        // No replanning until the fallback moves are used up.
        for _ in 1..fallback {
            assert_eq!(engine.tick().info.plan, None);
        }
        assert!(engine.is_alive());
        assert!(engine.tick().info.plan.is_some());
    }
}
