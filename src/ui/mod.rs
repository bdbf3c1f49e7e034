use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    error::{GameError, Result},
    events::{EventReceiver, EventSystem, GameEvent},
    game::TIMED_MODE_LIMIT_SECS,
    models::{Card, GameMode},
};

/// Username used when the player just presses enter
pub const DEFAULT_USERNAME: &str = "Player1";

/// Line-oriented terminal: any buffered async reader plus any writer
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Raw access to the output, for writers that take `impl Write`
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        self.output.flush()?;
        Ok(())
    }

    /// Print `text` without a newline and read one line back.
    /// The returned line has its line ending stripped but is otherwise raw.
    pub async fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(GameError::InputClosed);
        }

        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(line)
    }
}

/// Ask for the player's name; blank input means [`DEFAULT_USERNAME`]
pub async fn read_username<R, W>(console: &mut Console<R, W>) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let username = console.prompt("\nEnter your username: ").await?;
    Ok(normalize_username(&username))
}

pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Renders game events to the console and collects the player's input
pub struct UiController<R, W> {
    console: Console<R, W>,
    events: EventReceiver,
}

impl<R, W> UiController<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(console: Console<R, W>, event_system: &EventSystem) -> Self {
        Self {
            console,
            events: event_system.subscribe(),
        }
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        self.console.say(line)
    }

    /// Flush pending events to the screen, then prompt
    pub async fn prompt(&mut self, text: &str) -> Result<String> {
        self.render_pending()?;
        self.console.prompt(text).await
    }

    /// Render every event received so far
    pub fn render_pending(&mut self) -> Result<()> {
        while let Ok(event) = self.events.try_recv() {
            self.render(&event)?;
        }
        Ok(())
    }

    pub fn render(&mut self, event: &GameEvent) -> Result<()> {
        match event {
            GameEvent::GameStarted {
                username,
                mode,
                lives,
                rounds_to_win,
            } => {
                self.say(format!(
                    "\n{}, you are playing {} mode: {}.",
                    username,
                    mode,
                    mode.description()
                ))?;
                self.say(format!(
                    "Solve {} puzzles to win. Lives: {}",
                    rounds_to_win,
                    hearts(*lives)
                ))?;
                self.say("Type 'help' at any time for the rules.")?;
            }
            GameEvent::RoundStarted {
                round,
                cards,
                target,
                lives,
            } => {
                self.say(format!("\n--- Round {} ---   Lives: {}", round, hearts(*lives)))?;
                self.say(format!("Cards:  {}", hand_line(cards)))?;
                self.say(format!("Target: {}", target))?;
            }
            GameEvent::SelectionRejected { reason } => {
                self.say(format!("Invalid move: {}", reason))?;
            }
            GameEvent::AnswerCorrect {
                result,
                points,
                total_score,
            } => {
                self.say(format!(
                    "Correct! {} hits the target. +{} points (score {})",
                    result, points, total_score
                ))?;
            }
            GameEvent::AnswerWrong {
                result,
                target,
                lives,
            } => {
                self.say(format!(
                    "Wrong: that makes {}, the target was {}. Lives: {}",
                    result,
                    target,
                    hearts(*lives)
                ))?;
            }
            GameEvent::TimeExpired {
                elapsed_secs,
                limit_secs,
                lives,
            } => {
                self.say(format!(
                    "Too slow! {}s is over the {}s limit. Lives: {}",
                    elapsed_secs,
                    limit_secs,
                    hearts(*lives)
                ))?;
            }
            GameEvent::RoundSkipped { lives } => {
                self.say(format!("Round skipped. Lives: {}", hearts(*lives)))?;
            }
            GameEvent::GameOver {
                won,
                score,
                rounds_solved,
                duration_secs,
            } => {
                let banner = if *won { "You win!" } else { "Game over" };
                self.say(format!("\n=== {} ===", banner))?;
                self.say(format!("Final score: {}", score))?;
                self.say(format!("Puzzles solved: {}", rounds_solved))?;
                self.say(format!("Time: {}s", duration_secs))?;
            }
            GameEvent::NewHighScore { score } => {
                self.say(format!("New high score: {}!", score))?;
            }
            GameEvent::AchievementUnlocked {
                name,
                description,
                icon,
            } => {
                self.say(format!(
                    "Achievement unlocked: {} {} ({})",
                    icon, name, description
                ))?;
            }
        }
        Ok(())
    }

    pub fn show_help(&mut self, points_per_correct: u32) -> Result<()> {
        self.say("\nHow to play:")?;
        self.say("  Combine at least two of your cards with one operation to hit the target.")?;
        self.say("  Card values: A=1, 2-10 as printed, J=11, Q=12, K=13.")?;
        self.say("  Enter the operation then the card numbers, e.g. '+ 1 3' or '* 2 4 5'.")?;
        self.say("  Results are worked out left to right; division rounds toward zero.")?;
        self.say(format!(
            "  A correct answer is worth {} points plus speed and card bonuses.",
            points_per_correct
        ))?;
        self.say("  A wrong answer costs a heart. 'skip' costs a heart, 'quit' ends the game.")?;
        self.say(format!(
            "  Timed mode: answer within {}s. The clock restarts after 'help', invalid moves do not pause it.",
            TIMED_MODE_LIMIT_SECS
        ))?;
        Ok(())
    }

    pub fn show_modes(&mut self) -> Result<()> {
        self.say("\nChoose a game mode:")?;
        for (i, mode) in GameMode::ALL.iter().enumerate() {
            self.say(format!("  {}) {:<8} {}", i + 1, mode, mode.description()))?;
        }
        Ok(())
    }
}

fn hearts(lives: u32) -> String {
    if lives == 0 {
        "none".to_string()
    } else {
        "♥".repeat(lives as usize)
    }
}

fn hand_line(cards: &[Card]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| format!("{}) {}", i + 1, card))
        .collect::<Vec<_>>()
        .join("   ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rank, Suit};
    use tokio::io::BufReader;

    fn console<'a>(input: &'a [u8], output: &'a mut Vec<u8>) -> Console<&'a [u8], &'a mut Vec<u8>> {
        Console::new(input, output)
    }

    #[tokio::test]
    async fn test_blank_username_defaults() {
        for input in [&b"\n"[..], &b"   \n"[..], &b"\t \r\n"[..]] {
            let mut out = Vec::new();
            let mut console = console(input, &mut out);
            assert_eq!(read_username(&mut console).await.unwrap(), "Player1");
        }
    }

    #[tokio::test]
    async fn test_username_is_trimmed() {
        let mut out = Vec::new();
        let mut console = console(b"   ada lovelace  \n", &mut out);
        assert_eq!(read_username(&mut console).await.unwrap(), "ada lovelace");
        drop(console);
        assert_eq!(String::from_utf8(out).unwrap(), "\nEnter your username: ");
    }

    #[tokio::test]
    async fn test_username_from_scripted_terminal() {
        let input = tokio_test::io::Builder::new()
            .read(b"  grace")
            .read(b"  \n")
            .build();
        let mut console = Console::new(BufReader::new(input), Vec::new());
        assert_eq!(read_username(&mut console).await.unwrap(), "grace");
    }

    #[tokio::test]
    async fn test_prompt_at_eof_is_input_closed() {
        let mut out = Vec::new();
        let mut console = console(b"", &mut out);
        assert!(matches!(
            console.prompt("> ").await,
            Err(GameError::InputClosed)
        ));
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let mut out = Vec::new();
        let mut console = console(b"quit", &mut out);
        assert_eq!(console.prompt("> ").await.unwrap(), "quit");
    }

    #[tokio::test]
    async fn test_prompt_renders_pending_events_first() {
        let events = EventSystem::new();
        let mut out = Vec::new();
        {
            let mut ui = UiController::new(console(b"+ 1 2\n", &mut out), &events);
            events.emit(GameEvent::RoundStarted {
                round: 2,
                cards: vec![
                    Card::new(Suit::Hearts, Rank::ACE),
                    Card::new(Suit::Spades, Rank::KING),
                ],
                target: 9,
                lives: 2,
            });
            assert_eq!(ui.prompt("Move: ").await.unwrap(), "+ 1 2");
        }

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("--- Round 2 ---   Lives: ♥♥"));
        assert!(text.contains("1) A♥   2) K♠"));
        assert!(text.contains("Target: 9"));
        assert!(text.ends_with("Move: "));
    }

    #[test]
    fn test_render_game_over() {
        let events = EventSystem::new();
        let mut out = Vec::new();
        {
            let mut ui = UiController::new(console(b"", &mut out), &events);
            ui.render(&GameEvent::GameOver {
                won: false,
                score: 88,
                rounds_solved: 2,
                duration_secs: 41,
            })
            .unwrap();
            ui.render(&GameEvent::AnswerWrong {
                result: 3,
                target: 4,
                lives: 0,
            })
            .unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=== Game over ==="));
        assert!(text.contains("Final score: 88"));
        assert!(text.contains("Lives: none"));
    }

    #[test]
    fn test_hearts() {
        assert_eq!(hearts(3), "♥♥♥");
        assert_eq!(hearts(0), "none");
    }
}
