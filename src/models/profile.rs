use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, storage::ProfileStore};

/// Cumulative statistics for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub high_score: u64,
    /// Fastest winning game; `None` until the first win
    pub best_time_seconds: Option<u64>,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// A persisted player identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: String,
    #[serde(default)]
    pub stats: PlayerStats,
    /// Unlocked achievement ids, in unlock order
    #[serde(default)]
    pub achievements: Vec<String>,
    pub registered_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl PlayerProfile {
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            username: username.into(),
            stats: PlayerStats::default(),
            achievements: Vec::new(),
            registered_at: now,
            last_login: now,
        }
    }

    /// Fetch the stored profile for `username`, or start a new one
    pub fn load_or_create(store: &ProfileStore, username: &str) -> Self {
        store.load_or_create(username)
    }

    /// Persist this profile to `store`
    pub async fn save_profile(&self, store: &mut ProfileStore) -> Result<()> {
        store.save(self).await
    }

    /// Fold a finished game into the statistics.
    /// Returns true when `score` set a new high score.
    pub fn record_game(&mut self, won: bool, score: u64, time_seconds: u64) -> bool {
        let stats = &mut self.stats;
        stats.games_played += 1;

        if won {
            stats.games_won += 1;
            stats.current_streak += 1;
            stats.best_streak = stats.best_streak.max(stats.current_streak);
            stats.best_time_seconds = Some(match stats.best_time_seconds {
                Some(best) => best.min(time_seconds),
                None => time_seconds,
            });
        } else {
            stats.games_lost += 1;
            stats.current_streak = 0;
        }

        let new_high = score > stats.high_score;
        if new_high {
            stats.high_score = score;
        }

        self.last_login = Utc::now();
        new_high
    }

    pub fn win_rate(&self) -> f32 {
        if self.stats.games_played == 0 {
            0.0
        } else {
            (self.stats.games_won as f32 / self.stats.games_played as f32) * 100.0
        }
    }

    /// Returns false when the achievement was already unlocked
    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        if self.has_achievement(id) {
            return false;
        }
        self.achievements.push(id.to_string());
        true
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }
}
