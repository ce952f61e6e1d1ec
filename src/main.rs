use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pathsnake::game::GameConfig;
use pathsnake::metrics::MetricsSummary;
use pathsnake::modes::{HeadlessConfig, HeadlessMode, PlayMode};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pathsnake")]
#[command(version, about = "Snake game steered by an A* autopilot")]
struct Cli {
    /// Run mode
    #[arg(long, value_enum, default_value = "play")]
    mode: Mode,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the square board
    #[arg(long)]
    board_size: Option<usize>,

    /// Milliseconds between game ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Start with the autopilot off
    #[arg(long)]
    manual: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Episodes to play in headless mode
    #[arg(long, default_value = "10")]
    episodes: u32,

    /// Tick cap per headless episode
    #[arg(long, default_value = "10000")]
    max_ticks: u32,

    /// Write logs to this file (play mode logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Watch or play in the terminal
    Play,
    /// Run episodes without a UI and print statistics
    Headless,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(board_size) = self.board_size {
            config.board_size = board_size;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        if self.manual {
            config.autopilot = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(mode: &Mode, log_file: Option<&Path>) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (log_file, mode) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (None, Mode::Headless) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
        }
        // Anything written to the terminal would tear the TUI
        (None, Mode::Play) => {}
    }

    Ok(())
}

fn print_summary(summary: &MetricsSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{}", "=".repeat(40));
    println!("Games played: {}", summary.games_played);
    println!("Games won:    {}", summary.games_won);
    println!("High score:   {}", summary.high_score);
    println!("Mean score:   {:.1}", summary.mean_score);
    println!("Food eaten:   {}", summary.food_eaten);
    println!(
        "Plans:        {} found, {} failed",
        summary.plans_found, summary.plans_failed
    );
    println!("Elapsed:      {:.1}s", summary.elapsed_secs);
    println!("{}", "=".repeat(40));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.mode, cli.log_file.as_deref())?;

    let config = cli.game_config()?;

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Play => {
            let mut play_mode = PlayMode::new(config);
            let metrics = play_mode.run().await?;
            print_summary(&metrics.summary(), cli.json)?;
        }
        Mode::Headless => {
            let mut headless_mode =
                HeadlessMode::new(config, HeadlessConfig::new(cli.episodes, cli.max_ticks));
            let summary = headless_mode.run()?;
            print_summary(&summary, cli.json)?;
        }
    }

    Ok(())
}
