//! pathsnake - a terminal snake game steered by an A* autopilot
//!
//! - Core simulation: grid, ring-buffer snake, tick engine (game module)
//! - Route planning over body snapshots (agent module)
//! - TUI rendering and key handling (render, input modules)
//! - Interactive and headless runners (modes module)

pub mod agent;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
