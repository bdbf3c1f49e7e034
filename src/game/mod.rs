// Game engine modules

pub mod engine;
pub mod scorer;
pub mod validator;

pub use engine::GameEngine;
pub use scorer::Scorer;
pub use validator::{Move, MoveValidator, Selection};

/// Cards dealt for every puzzle
pub const CARDS_PER_ROUND: usize = 5;
/// Solved puzzles needed to win a session
pub const ROUNDS_TO_WIN: u32 = 5;
/// Answer time limit in Timed mode (seconds)
pub const TIMED_MODE_LIMIT_SECS: u64 = 30;
