pub mod headless;
pub mod play;

pub use headless::{EpisodeEnd, EpisodeReport, HeadlessConfig, HeadlessMode};
pub use play::PlayMode;
