mod achievements;
mod api;
mod config;
mod error;
mod events;
mod game;
mod models;
mod storage;
mod ui;

use std::{future::Future, io::Write};

use anyhow::{Context, Result};
use api::{ApiHandler, CardSource};
use config::{Config, Environment};
use error::GameError;
use events::EventSystem;
use game::GameEngine;
use models::PlayerProfile;
use storage::ProfileStore;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::{Console, UiController};

pub const INTERRUPTED_MESSAGE: &str = "\n\nGame interrupted. Goodbye!";
/// Players listed after a session
pub const LEADERBOARD_SIZE: usize = 5;

/// How the process should end
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    Finished,
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout belongs to the game
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heart_game=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let environment = Environment::from_env();
    tracing::debug!("Environment: {:?}", environment);

    let console = Console::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    let exit = run_until_interrupted(run(&environment, console), interrupt_signal()).await?;

    if exit == Exit::Interrupted {
        println!("{}", INTERRUPTED_MESSAGE);
        // A pending stdin read would block runtime shutdown
        std::process::exit(0);
    }

    Ok(())
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Race the session against `interrupt`. Closed input counts as an interrupt.
async fn run_until_interrupted<F, S>(session: F, interrupt: S) -> Result<Exit>
where
    F: Future<Output = Result<()>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        result = session => match result {
            Ok(()) => Ok(Exit::Finished),
            Err(e) if matches!(e.downcast_ref::<GameError>(), Some(GameError::InputClosed)) => {
                tracing::info!("Input closed");
                Ok(Exit::Interrupted)
            }
            Err(e) => Err(e),
        },
        _ = interrupt => {
            tracing::info!("Interrupted by user");
            Ok(Exit::Interrupted)
        }
    }
}

/// Banner, configuration and card API, then one game
async fn run<R, W>(environment: &Environment, mut console: Console<R, W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say("=".repeat(50))?;
    console.say("Welcome to Heart Game!")?;
    console.say("=".repeat(50))?;

    let config =
        config::load_config(environment, console.output()).context("Failed to load config")?;
    tracing::info!("Configuration loaded");

    let api_handler =
        ApiHandler::new(&config.api_url).context("Failed to create card API client")?;
    tracing::info!("Card API client for {}", api_handler.api_url());

    play(environment, &config, console, api_handler).await
}

/// Everything from the username prompt to the farewell
async fn play<C, R, W>(
    environment: &Environment,
    config: &Config,
    mut console: Console<R, W>,
    card_source: C,
) -> Result<()>
where
    C: CardSource,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let username = ui::read_username(&mut console).await?;

    let mut store = ProfileStore::open(&environment.profiles_path)
        .await
        .context("Failed to open profile store")?;
    let mut player = PlayerProfile::load_or_create(&store, &username);
    console.say(format!("\nWelcome back, {}!", player.username))?;
    console.say(format!("Games Played: {}", player.stats.games_played))?;
    console.say(format!("High Score: {}", player.stats.high_score))?;

    let event_system = EventSystem::new();
    let mut ui_controller = UiController::new(console, &event_system);

    let session = {
        let mut game = GameEngine::new(
            event_system.clone(),
            card_source,
            &mut player,
            config,
            &mut ui_controller,
        )
        .with_mode(environment.mode);

        let session = game.start().await?;
        session
    };
    tracing::debug!(
        "Session {} ended after {} events to {} listeners",
        session.session_id,
        event_system.emitted(),
        event_system.subscriber_count()
    );

    player
        .save_profile(&mut store)
        .await
        .context("Failed to save profile")?;
    ui_controller.say(format!("\nProgress saved for {}", player.username))?;
    show_leaderboard(&mut ui_controller, &store)?;
    ui_controller.say("Thanks for playing!")?;

    Ok(())
}

fn show_leaderboard<R, W>(ui: &mut UiController<R, W>, store: &ProfileStore) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let leaders = store.leaderboard(LEADERBOARD_SIZE);
    if leaders.len() < 2 {
        return Ok(());
    }

    ui.say("\nLeaderboard:")?;
    for (rank, profile) in leaders.iter().enumerate() {
        ui.say(format!(
            "  {}. {:<16} {:>6}  ({:.0}% wins)",
            rank + 1,
            profile.username,
            profile.stats.high_score,
            profile.win_rate()
        ))?;
    }
    Ok(())
}
