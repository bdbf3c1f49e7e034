use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc;

use crate::models::{Card, GameMode};

/// Everything the engine announces while a session runs
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted {
        username: String,
        mode: GameMode,
        lives: u32,
        rounds_to_win: u32,
    },
    RoundStarted {
        round: u32,
        cards: Vec<Card>,
        target: i64,
        lives: u32,
    },
    SelectionRejected {
        reason: String,
    },
    AnswerCorrect {
        result: i64,
        points: u64,
        total_score: u64,
    },
    AnswerWrong {
        result: i64,
        target: i64,
        lives: u32,
    },
    TimeExpired {
        elapsed_secs: u64,
        limit_secs: u64,
        lives: u32,
    },
    RoundSkipped {
        lives: u32,
    },
    GameOver {
        won: bool,
        score: u64,
        rounds_solved: u32,
        duration_secs: u64,
    },
    NewHighScore {
        score: u64,
    },
    AchievementUnlocked {
        name: String,
        description: String,
        icon: String,
    },
}

pub type EventReceiver = mpsc::UnboundedReceiver<GameEvent>;

/// Fan-out of [`GameEvent`]s to every subscriber, in emission order.
///
/// Cloning yields another handle to the same set of subscribers.
#[derive(Clone, Default)]
pub struct EventSystem {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<GameEvent>>>>,
    emitted: Arc<AtomicU64>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(tx);
        rx
    }

    /// Deliver `event` to all live subscribers; dropped receivers are pruned
    pub fn emit(&self, event: GameEvent) {
        tracing::debug!("Emitting {:?}", event);
        self.emitted.fetch_add(1, Ordering::Relaxed);

        self.lock_subscribers()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Total events emitted through any handle
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<GameEvent>>> {
        // A panicked emitter cannot leave the list half-updated
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
