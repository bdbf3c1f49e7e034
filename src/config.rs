use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{error::Result, models::GameMode};

pub const DEFAULT_API_URL: &str = "https://www.random.org/integers/";
pub const DEFAULT_LIVES: u32 = 3;
pub const DEFAULT_POINTS_PER_CORRECT: u32 = 10;

/// Game settings read from `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub default_lives: u32,
    pub points_per_correct: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            default_lives: DEFAULT_LIVES,
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
        }
    }
}

impl Config {
    /// Load the config file at `path`.
    ///
    /// A missing file is not an error: the notice is written to `out` and
    /// the built-in defaults are returned. Anything else (unreadable file,
    /// malformed JSON, missing keys) is propagated.
    pub fn load<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                writeln!(out, "Config file not found, using defaults")?;
                tracing::info!("No config at {}, falling back to defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config = ::config::Config::builder()
            .add_source(::config::File::from_str(&content, ::config::FileFormat::Json))
            .build()?
            .try_deserialize::<Config>()?;

        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

/// Process-level settings taken from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Environment {
    pub config_path: PathBuf,
    pub profiles_path: PathBuf,
    /// Skips the mode prompt when set
    pub mode: Option<GameMode>,
}

impl Environment {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mode = env::var("HEART_GAME_MODE").ok().and_then(|raw| {
            let parsed = raw.parse::<GameMode>().ok();
            if parsed.is_none() {
                tracing::warn!("Ignoring unknown HEART_GAME_MODE value {:?}", raw);
            }
            parsed
        });

        Self {
            config_path: env::var("HEART_GAME_CONFIG")
                .unwrap_or_else(|_| "config.json".to_string())
                .into(),
            profiles_path: env::var("HEART_GAME_PROFILES")
                .unwrap_or_else(|_| "players.json".to_string())
                .into(),
            mode,
        }
    }
}

/// Read `config.json` from the configured location
pub fn load_config<W: Write>(environment: &Environment, out: &mut W) -> Result<Config> {
    Config::load(&environment.config_path, out)
}
