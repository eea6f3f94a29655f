use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::{Playlist, StationConfig};
use crate::error::{Error, Result};

/// Persists playlists the generator has to create on its own.
pub trait PlaylistRepository {
    /// Create, persist and return an empty default playlist for `station`.
    fn create_default(&mut self, station: &StationConfig) -> Result<Playlist>;
}

/// A station stored as a single TOML or JSON file (picked by extension)
#[derive(Debug, Clone)]
pub struct StationFile {
    path: PathBuf,
}

impl StationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<StationConfig> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;

        let parsed = if self.is_json() {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| Error::Parse {
            path: self.path.clone(),
            message,
        })
    }

    pub fn save(&self, station: &StationConfig) -> Result<()> {
        let rendered = if self.is_json() {
            serde_json::to_string_pretty(station).map_err(|e| e.to_string())
        } else {
            toml::to_string_pretty(station).map_err(|e| e.to_string())
        };
        let content = rendered.map_err(|message| Error::Parse {
            path: self.path.clone(),
            message,
        })?;

        fs::write(&self.path, content).map_err(|e| Error::io(&self.path, e))?;
        info!("Saved station '{}' to {}", station.name, self.path.display());
        Ok(())
    }

    fn is_json(&self) -> bool {
        self.path.extension().and_then(|s| s.to_str()) == Some("json")
    }
}

impl PlaylistRepository for StationFile {
    fn create_default(&mut self, station: &StationConfig) -> Result<Playlist> {
        // Re-read so we never clobber edits made since the caller loaded it
        let mut stored = self.load()?;
        if stored.id != station.id {
            return Err(Error::Repository(format!(
                "{} holds station {}, not station {}",
                self.path.display(),
                stored.id,
                station.id
            )));
        }

        let playlist = Playlist::empty_default();
        stored.playlists.push(playlist.clone());
        self.save(&stored)?;

        info!("Created default playlist for station '{}'", station.name);
        Ok(playlist)
    }
}
