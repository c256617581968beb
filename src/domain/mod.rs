//! Core domain types for the treasure hunt

mod player;
mod progress;

pub use player::{Photo, Player, PlayerSummary, PlayerView, Purchase, Role};
pub use progress::{game_key, Phase, Progress};

/// Identifier of a hunt step (stable, not necessarily contiguous)
pub type StepId = u32;

/// Identifier of a game within a step
pub type GameId = u32;
