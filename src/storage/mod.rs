use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

use crate::{error::Result, models::PlayerProfile};

/// All player profiles, stored as one JSON object keyed by username
pub struct ProfileStore {
    path: PathBuf,
    profiles: HashMap<String, PlayerProfile>,
}

impl ProfileStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let profiles = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    "No profile store at {}, starting fresh",
                    path.display()
                );
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Loaded {} player profiles", profiles.len());

        Ok(Self { path, profiles })
    }

    pub fn get(&self, username: &str) -> Option<&PlayerProfile> {
        self.profiles.get(username)
    }

    /// Stored profile with a fresh login time, or a brand new profile.
    /// Nothing is written until [`ProfileStore::save`].
    pub fn load_or_create(&self, username: &str) -> PlayerProfile {
        match self.get(username) {
            Some(existing) => {
                tracing::debug!("Found existing profile for {}", username);
                let mut profile = existing.clone();
                profile.last_login = chrono::Utc::now();
                profile
            }
            None => {
                tracing::info!("Creating new profile for {}", username);
                PlayerProfile::new(username)
            }
        }
    }

    /// Upsert `profile` and rewrite the whole file
    pub async fn save(&mut self, profile: &PlayerProfile) -> Result<()> {
        self.profiles
            .insert(profile.username.clone(), profile.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&self.profiles)?;
        fs::write(&self.path, json).await?;

        tracing::info!(
            "Saved profile for {} to {}",
            profile.username,
            self.path.display()
        );
        Ok(())
    }

    /// Profiles by high score (descending), ties broken by username
    pub fn leaderboard(&self, limit: usize) -> Vec<&PlayerProfile> {
        let mut ranked: Vec<&PlayerProfile> = self.profiles.values().collect();
        ranked.sort_by(|a, b| {
            b.stats
                .high_score
                .cmp(&a.stats.high_score)
                .then_with(|| a.username.cmp(&b.username))
        });
        ranked.truncate(limit);
        ranked
    }
}
