use once_cell::sync::Lazy;

use crate::models::PlayerProfile;

#[derive(Debug, Clone)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    unlocked_when: fn(&PlayerProfile) -> bool,
}

impl Achievement {
    pub fn is_earned_by(&self, profile: &PlayerProfile) -> bool {
        (self.unlocked_when)(profile)
    }
}

pub static ACHIEVEMENTS: Lazy<Vec<Achievement>> = Lazy::new(|| {
    vec![
        Achievement {
            id: "FIRST_WIN",
            name: "First Victory",
            description: "Win your first game",
            icon: "🏆",
            unlocked_when: |p| p.stats.games_won >= 1,
        },
        Achievement {
            id: "SPEED_DEMON",
            name: "Speed Demon",
            description: "Win a game in under 30 seconds",
            icon: "⚡",
            unlocked_when: |p| p.stats.best_time_seconds.is_some_and(|t| t <= 30),
        },
        Achievement {
            id: "PERFECT_SCORE",
            name: "Perfect Score",
            description: "Achieve a score of 1000 or more",
            icon: "⭐",
            unlocked_when: |p| p.stats.high_score >= 1000,
        },
        Achievement {
            id: "DEDICATED",
            name: "Dedicated Player",
            description: "Play 10 games",
            icon: "🎮",
            unlocked_when: |p| p.stats.games_played >= 10,
        },
        Achievement {
            id: "STREAK_MASTER",
            name: "Streak Master",
            description: "Win 5 games in a row",
            icon: "🔥",
            unlocked_when: |p| p.stats.best_streak >= 5,
        },
        Achievement {
            id: "VETERAN",
            name: "Veteran",
            description: "Play 50 games",
            icon: "🎖️",
            unlocked_when: |p| p.stats.games_played >= 50,
        },
    ]
});

/// Unlock everything the profile now qualifies for.
/// Returns only the achievements unlocked by this call.
pub fn check_and_unlock(profile: &mut PlayerProfile) -> Vec<&'static Achievement> {
    let mut newly_unlocked = Vec::new();

    for achievement in ACHIEVEMENTS.iter() {
        if !profile.has_achievement(achievement.id) && achievement.is_earned_by(profile) {
            profile.unlock_achievement(achievement.id);
            tracing::info!("{} unlocked {}", profile.username, achievement.id);
            newly_unlocked.push(achievement);
        }
    }

    newly_unlocked
}
