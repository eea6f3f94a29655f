use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Weight given to playlists that don't say otherwise (and to the auto-created default).
pub const DEFAULT_WEIGHT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    /// Part of the general rotation - feeds the weighted random fallback.
    #[default]
    Default,
    Scheduled,
    OncePerXSongs,
    OncePerXMinutes,
}

/// Track-list file formats the engine's `playlist()` source can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackListFormat {
    #[default]
    M3u,
    Pls,
}

impl TrackListFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TrackListFormat::M3u => "m3u",
            TrackListFormat::Pls => "pls",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub path: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    /// Length in seconds, if known.
    #[serde(default)]
    pub duration: Option<u64>,
}

impl PlaylistTrack {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
            artist: None,
            duration: None,
        }
    }

    /// "Artist - Title", falling back to whatever we have, then the file name.
    fn display_title(&self) -> String {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => format!("{} - {}", artist, title),
            (None, Some(title)) => title.clone(),
            (Some(artist), None) => artist.clone(),
            (None, None) => self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// A station playlist as the backend sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    #[serde(default, rename = "type")]
    pub kind: PlaylistKind,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub tracks: Vec<PlaylistTrack>,
}

fn enabled_by_default() -> bool {
    true
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

impl Playlist {
    /// Create a new empty, enabled playlist in the general rotation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            is_enabled: true,
            kind: PlaylistKind::Default,
            weight: DEFAULT_WEIGHT,
            tracks: Vec::new(),
        }
    }

    /// The empty playlist created when a station has nothing in rotation.
    pub fn empty_default() -> Self {
        Self::new("default")
    }

    pub fn is_default(&self) -> bool {
        self.kind == PlaylistKind::Default
    }

    /// Short name used for file and variable names. Always a valid identifier fragment.
    pub fn short_name(&self) -> String {
        let source = self.short_name.as_deref().unwrap_or(&self.name);
        normalize_short_name(source)
    }

    /// Render the track list for the engine. Paths are written as-is, so keep them absolute.
    pub fn export(&self, format: TrackListFormat) -> String {
        let mut out = String::new();
        match format {
            TrackListFormat::M3u => {
                out.push_str("#EXTM3U\n");
                for track in &self.tracks {
                    let seconds = track.duration.map(|d| d as i64).unwrap_or(-1);
                    let _ = writeln!(out, "#EXTINF:{},{}", seconds, track.display_title());
                    let _ = writeln!(out, "{}", track.path.display());
                }
            }
            TrackListFormat::Pls => {
                out.push_str("[playlist]\n");
                for (i, track) in self.tracks.iter().enumerate() {
                    let n = i + 1;
                    let _ = writeln!(out, "File{}={}", n, track.path.display());
                    let _ = writeln!(out, "Title{}={}", n, track.display_title());
                    let seconds = track.duration.map(|d| d as i64).unwrap_or(-1);
                    let _ = writeln!(out, "Length{}={}", n, seconds);
                }
                let _ = writeln!(out, "NumberOfEntries={}", self.tracks.len());
                out.push_str("Version=2\n");
            }
        }
        out
    }
}

fn short_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Lower-case, collapse anything non-alphanumeric into single underscores.
pub fn normalize_short_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let collapsed = short_name_pattern().replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        "playlist".to_string()
    } else {
        trimmed.to_string()
    }
}
