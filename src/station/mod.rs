// Station model - everything the generator needs to know about one station
// Persistence lives elsewhere; this is the typed view of it

pub mod playlist;   // playlists + track-list export
pub mod ports;      // deterministic per-station ports
pub mod repository; // where auto-created playlists get persisted

pub use playlist::{Playlist, PlaylistKind, PlaylistTrack, TrackListFormat};
pub use ports::StationPorts;
pub use repository::{PlaylistRepository, StationFile};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Key the engine presents to the internal API.
    pub api_key: String,
    #[serde(default)]
    pub backend: BackendSettings,
    pub frontend: FrontendSettings,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Seconds; 0 turns crossfading off.
    pub crossfade: u32,
    /// Raw script appended verbatim after the crossfade block.
    pub custom_config: Option<String>,
    pub playlist_format: TrackListFormat,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            crossfade: 2,
            custom_config: None,
            playlist_format: TrackListFormat::M3u,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendType {
    #[default]
    Icecast,
    Shoutcast2,
    /// Relay to someone else's server; AutoDJ can't feed it.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendSettings {
    #[serde(default, rename = "type")]
    pub kind: FrontendType,
    pub port: u16,
    pub source_pw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutodjFormat {
    #[default]
    Mp3,
    Aac,
    Ogg,
}

pub const DEFAULT_BITRATE: u32 = 128;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    pub name: String,
    #[serde(default)]
    pub enable_autodj: bool,
    #[serde(default)]
    pub autodj_format: AutodjFormat,
    #[serde(default = "default_bitrate")]
    pub autodj_bitrate: u32,
    #[serde(default)]
    pub is_public: bool,
}

fn default_bitrate() -> u32 {
    DEFAULT_BITRATE
}

impl Mount {
    pub fn new(name: impl Into<String>, format: AutodjFormat, bitrate: u32) -> Self {
        Self {
            name: name.into(),
            enable_autodj: true,
            autodj_format: format,
            autodj_bitrate: bitrate,
            is_public: false,
        }
    }

    /// A zero bitrate means "not set".
    pub fn bitrate(&self) -> u32 {
        if self.autodj_bitrate == 0 {
            DEFAULT_BITRATE
        } else {
            self.autodj_bitrate
        }
    }
}

impl StationConfig {
    /// Check the things generation relies on. Called once, up front.
    pub fn validate(&self) -> Result<()> {
        StationPorts::for_station(self.id)?;

        if let Some(unnamed) = self.playlists.iter().position(|p| p.name.trim().is_empty()) {
            return Err(Error::Configuration(format!(
                "playlist #{} of station {} has no name",
                unnamed + 1,
                self.id
            )));
        }

        Ok(())
    }

    pub fn ports(&self) -> Result<StationPorts> {
        StationPorts::for_station(self.id)
    }

    /// Directory-safe form of the station name.
    pub fn short_name(&self) -> String {
        playlist::normalize_short_name(&self.name)
    }

    pub fn has_default_playlist(&self) -> bool {
        self.playlists.iter().any(|p| p.is_enabled && p.is_default())
    }
}
