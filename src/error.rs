use thiserror::Error;

/// Errors surfaced by the game's collaborators
#[derive(Debug, Error)]
pub enum GameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Card API returned status {status}")]
    Api { status: u16 },

    #[error("Card API returned an unusable body: {0}")]
    InvalidApiResponse(String),

    /// Standard input reached end of file while the game was waiting for the player
    #[error("Input closed")]
    InputClosed,
}

pub type Result<T> = std::result::Result<T, GameError>;
