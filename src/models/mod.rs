pub mod player;

pub use player::{Player, PlayerUpdate, Progress, ProgressPatch};
