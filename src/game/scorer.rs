use crate::models::GameMode;

/// Breakdown of the points awarded for one solved puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundScore {
    pub base: u64,
    pub time_bonus: u64,
    pub card_bonus: u64,
    pub difficulty: u64,
    pub mode_multiplier: u64,
    /// Total points for the round
    pub total: u64,
}

pub struct Scorer;

impl Scorer {
    /// Seconds after which the time bonus is gone
    pub const TIME_BONUS_WINDOW: u64 = 30;
    pub const POINTS_PER_CARD: u64 = 2;

    /// Score a solved puzzle.
    ///
    /// Scoring rules:
    /// - `points_per_correct` is the base
    /// - +1 per second left of a 30 second window
    /// - +2 per card used
    /// - the sum is multiplied by the difficulty (target / 10, at least 1)
    /// - then by the game mode multiplier
    pub fn score_round(
        points_per_correct: u32,
        target: i64,
        elapsed_secs: u64,
        cards_used: usize,
        mode: GameMode,
    ) -> RoundScore {
        let base = u64::from(points_per_correct);
        let time_bonus = Self::time_bonus(elapsed_secs);
        let card_bonus = cards_used as u64 * Self::POINTS_PER_CARD;
        let difficulty = Self::difficulty(target);
        let mode_multiplier = mode.score_multiplier();

        RoundScore {
            base,
            time_bonus,
            card_bonus,
            difficulty,
            mode_multiplier,
            total: (base + time_bonus + card_bonus) * difficulty * mode_multiplier,
        }
    }

    fn time_bonus(elapsed_secs: u64) -> u64 {
        Self::TIME_BONUS_WINDOW.saturating_sub(elapsed_secs)
    }

    fn difficulty(target: i64) -> u64 {
        (target / 10).max(1) as u64
    }
}
