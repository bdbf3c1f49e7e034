use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Play until lives run out or enough puzzles are solved
    #[default]
    Classic,
    /// Answers slower than the time limit cost a life
    Timed,
    /// A single life: the first miss ends the game
    Streak,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::Timed, GameMode::Streak];

    pub fn score_multiplier(self) -> u64 {
        match self {
            GameMode::Classic => 1,
            GameMode::Timed => 2,
            GameMode::Streak => 3,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameMode::Classic => "solve puzzles until your hearts run out",
            GameMode::Timed => "answer within the time limit or lose a heart",
            GameMode::Streak => "one heart, triple points",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameMode::Classic => "Classic",
            GameMode::Timed => "Timed",
            GameMode::Streak => "Streak",
        };
        f.pad(name)
    }
}

impl FromStr for GameMode {
    type Err = String;

    /// Accepts the mode name (any case) or its menu number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "classic" => Ok(GameMode::Classic),
            "2" | "timed" => Ok(GameMode::Timed),
            "3" | "streak" => Ok(GameMode::Streak),
            other => Err(format!("unknown game mode '{}'", other)),
        }
    }
}

/// Bookkeeping for one play-through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: Uuid,
    pub username: String,
    pub mode: GameMode,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub rounds_played: u32,
    pub rounds_solved: u32,
    pub score: u64,
    pub won: bool,
}

impl GameSession {
    pub fn new(username: impl Into<String>, mode: GameMode) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            username: username.into(),
            mode,
            started_at: Utc::now(),
            ended_at: None,
            rounds_played: 0,
            rounds_solved: 0,
            score: 0,
            won: false,
        }
    }

    pub fn finish(&mut self, won: bool) {
        self.won = won;
        self.ended_at = Some(Utc::now());
    }

    /// Whole seconds from start to finish (or to now while running)
    pub fn duration_secs(&self) -> u64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds().max(0) as u64
    }
}
