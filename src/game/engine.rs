use std::{io::Write, time::Duration};
use tokio::{io::AsyncBufRead, time::Instant};

use crate::{
    achievements,
    api::CardSource,
    config::Config,
    error::Result,
    events::{EventSystem, GameEvent},
    game::{
        Move, MoveValidator, Scorer, Selection, CARDS_PER_ROUND, ROUNDS_TO_WIN,
        TIMED_MODE_LIMIT_SECS,
    },
    models::{Card, GameMode, GameSession, PlayerProfile},
    ui::UiController,
};

const TIME_LIMIT: Duration = Duration::from_secs(TIMED_MODE_LIMIT_SECS);

const MOVE_PROMPT: &str = "Your move (e.g. '+ 1 3', 'skip', 'quit', 'help'): ";

/// A move that ends the player's turn
enum Answer {
    Play(Selection),
    Skip,
    Quit,
}

/// Runs one game session for one player.
///
/// The engine only talks to the outside world through the event system,
/// the card source and the UI controller it was built with.
pub struct GameEngine<'a, C, R, W> {
    events: EventSystem,
    cards: C,
    player: &'a mut PlayerProfile,
    config: &'a Config,
    ui: &'a mut UiController<R, W>,
    mode: Option<GameMode>,
}

impl<'a, C, R, W> GameEngine<'a, C, R, W>
where
    C: CardSource,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        events: EventSystem,
        cards: C,
        player: &'a mut PlayerProfile,
        config: &'a Config,
        ui: &'a mut UiController<R, W>,
    ) -> Self {
        Self {
            events,
            cards,
            player,
            config,
            ui,
            mode: None,
        }
    }

    /// Play in `mode` instead of asking the player
    pub fn with_mode(mut self, mode: Option<GameMode>) -> Self {
        self.mode = mode;
        self
    }

    /// Play a full session and fold the result into the player's profile
    pub async fn start(&mut self) -> Result<GameSession> {
        let mode = match self.mode {
            Some(mode) => mode,
            None => self.choose_mode().await?,
        };

        let mut session = GameSession::new(self.player.username.clone(), mode);
        let mut lives = match mode {
            GameMode::Streak => 1,
            _ => self.config.default_lives.max(1),
        };

        tracing::info!(
            "Session {} started for {} ({} mode, {} lives)",
            session.session_id,
            session.username,
            mode,
            lives
        );

        self.events.emit(GameEvent::GameStarted {
            username: session.username.clone(),
            mode,
            lives,
            rounds_to_win: ROUNDS_TO_WIN,
        });

        while lives > 0 && session.rounds_solved < ROUNDS_TO_WIN {
            session.rounds_played += 1;

            let cards = self.cards.draw(CARDS_PER_ROUND).await;
            let target = self.cards.target_for(&cards);
            tracing::debug!(
                "Round {}: {} for {}",
                session.rounds_played,
                cards
                    .iter()
                    .map(Card::display_name)
                    .collect::<Vec<_>>()
                    .join(", "),
                target
            );
            self.events.emit(GameEvent::RoundStarted {
                round: session.rounds_played,
                cards: cards.clone(),
                target,
                lives,
            });

            let (answer, elapsed) = self.read_move(&cards).await?;
            let selection = match answer {
                Answer::Play(selection) => selection,
                Answer::Skip => {
                    lives -= 1;
                    self.events.emit(GameEvent::RoundSkipped { lives });
                    continue;
                }
                Answer::Quit => {
                    tracing::info!("{} quit in round {}", session.username, session.rounds_played);
                    break;
                }
            };

            if mode == GameMode::Timed && elapsed > TIME_LIMIT {
                lives -= 1;
                self.events.emit(GameEvent::TimeExpired {
                    elapsed_secs: elapsed.as_secs(),
                    limit_secs: TIMED_MODE_LIMIT_SECS,
                    lives,
                });
                continue;
            }

            let result = selection.evaluate(&cards);
            if result == target {
                let round_score = Scorer::score_round(
                    self.config.points_per_correct,
                    target,
                    elapsed.as_secs(),
                    selection.card_count(),
                    mode,
                );
                tracing::debug!(
                    "Scored ({} + {} time + {} cards) x{} difficulty x{} mode",
                    round_score.base,
                    round_score.time_bonus,
                    round_score.card_bonus,
                    round_score.difficulty,
                    round_score.mode_multiplier
                );
                let points = round_score.total;
                session.score += points;
                session.rounds_solved += 1;
                self.events.emit(GameEvent::AnswerCorrect {
                    result,
                    points,
                    total_score: session.score,
                });
            } else {
                lives -= 1;
                self.events.emit(GameEvent::AnswerWrong {
                    result,
                    target,
                    lives,
                });
            }
        }

        let won = session.rounds_solved >= ROUNDS_TO_WIN;
        session.finish(won);
        self.finish(&session);
        self.ui.render_pending()?;

        Ok(session)
    }

    /// Record the session on the profile and announce the outcome
    fn finish(&mut self, session: &GameSession) {
        let duration_secs = session.duration_secs();
        let new_high = self
            .player
            .record_game(session.won, session.score, duration_secs);

        tracing::info!(
            "Session {} finished: won={} score={} solved={}/{}",
            session.session_id,
            session.won,
            session.score,
            session.rounds_solved,
            session.rounds_played
        );

        self.events.emit(GameEvent::GameOver {
            won: session.won,
            score: session.score,
            rounds_solved: session.rounds_solved,
            duration_secs,
        });

        if new_high {
            self.events.emit(GameEvent::NewHighScore {
                score: session.score,
            });
        }

        for achievement in achievements::check_and_unlock(self.player) {
            self.events.emit(GameEvent::AchievementUnlocked {
                name: achievement.name.to_string(),
                description: achievement.description.to_string(),
                icon: achievement.icon.to_string(),
            });
        }
    }

    async fn choose_mode(&mut self) -> Result<GameMode> {
        self.ui.show_modes()?;
        loop {
            let answer = self.ui.prompt("Mode [1]: ").await?;
            if answer.trim().is_empty() {
                return Ok(GameMode::default());
            }
            match answer.parse::<GameMode>() {
                Ok(mode) => return Ok(mode),
                Err(reason) => self.ui.say(format!("Invalid choice: {}", reason))?,
            }
        }
    }

    /// Prompt until the player enters something playable.
    /// Also returns the answer time; the clock restarts after `help`,
    /// rejected moves keep it running.
    async fn read_move(&mut self, cards: &[Card]) -> Result<(Answer, Duration)> {
        let mut started = Instant::now();
        loop {
            let input = self.ui.prompt(MOVE_PROMPT).await?;
            let answer = match MoveValidator::parse(&input, cards.len()) {
                Ok(Move::Play(selection)) => {
                    tracing::debug!("Selection {:?} against {:?}", selection, cards);
                    Answer::Play(selection)
                }
                Ok(Move::Skip) => Answer::Skip,
                Ok(Move::Quit) => Answer::Quit,
                Ok(Move::Help) => {
                    self.ui.show_help(self.config.points_per_correct)?;
                    started = Instant::now();
                    continue;
                }
                Err(reason) => {
                    self.events.emit(GameEvent::SelectionRejected { reason });
                    continue;
                }
            };
            return Ok((answer, started.elapsed()));
        }
    }
}
