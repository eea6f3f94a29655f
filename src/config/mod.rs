// Configuration management for harbormaster
// Handles loading/saving settings, with sensible defaults when config is missing

use crate::error::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub stations_root: PathBuf,
    pub log_directory: PathBuf,
    #[serde(default)]
    pub deployment: DeploymentContext,
    #[serde(default)]
    pub control: ControlSettings,
}

/// Where the engine runs and how it reaches back to us.
///
/// Everything that used to hinge on "are we inside docker" lives here, so the
/// generator never has to look at the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentContext {
    pub inside_docker: bool,
    /// Address the engine's telnet server binds to.
    pub telnet_bind_addr: String,
    pub log_stdout: bool,
    /// Base URL the engine uses for `/api/internal/...` callbacks.
    pub internal_api_url: String,
    /// Host the control channel dials.
    pub control_host: String,
    /// Embedded as the stream URL when a station doesn't set one.
    pub public_base_url: String,
    pub engine_binary: Option<PathBuf>,
}

impl DeploymentContext {
    pub fn host() -> Self {
        Self {
            inside_docker: false,
            telnet_bind_addr: "127.0.0.1".to_string(),
            log_stdout: false,
            internal_api_url: "http://localhost".to_string(),
            control_host: "localhost".to_string(),
            public_base_url: "localhost".to_string(),
            engine_binary: None,
        }
    }

    pub fn docker() -> Self {
        Self {
            inside_docker: true,
            telnet_bind_addr: "0.0.0.0".to_string(),
            log_stdout: true,
            internal_api_url: "http://nginx".to_string(),
            control_host: "stations".to_string(),
            public_base_url: "localhost".to_string(),
            engine_binary: None,
        }
    }
}

impl Default for DeploymentContext {
    fn default() -> Self {
        Self::host()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub connect_timeout_secs: u64,
    /// 0 disables the read deadline entirely.
    pub read_timeout_secs: u64,
}

impl ControlSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 20,
            read_timeout_secs: 20,
        }
    }
}

/// Per-station directories the generator writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationPaths {
    pub playlist_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl StationPaths {
    pub fn new(playlist_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            playlist_dir: playlist_dir.into(),
            config_dir: config_dir.into(),
        }
    }

    /// `{root}/{short_name}/playlists` and `{root}/{short_name}/config`
    pub fn under(root: &Path, station_short_name: &str) -> Self {
        let base = root.join(station_short_name);
        Self::new(base.join("playlists"), base.join("config"))
    }

    pub fn script_path(&self) -> PathBuf {
        self.config_dir.join("liquidsoap.liq")
    }

    pub fn ensure_exists(&self) -> Result<()> {
        for dir in [&self.playlist_dir, &self.config_dir] {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harbormaster");

        Self {
            stations_root: data_dir.join("stations"),
            log_directory: data_dir.join("logs"),
            deployment: DeploymentContext::default(),
            control: ControlSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default location, writing defaults out on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path).map_err(|e| Error::io(config_path, e))?;
            let config: AppConfig = toml::from_str(&content).map_err(|e| Error::Parse {
                path: config_path.to_path_buf(),
                message: e.to_string(),
            })?;
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::Parse {
            path: config_path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(config_path, content).map_err(|e| Error::io(config_path, e))?;

        Ok(())
    }

    pub fn station_paths(&self, station_short_name: &str) -> StationPaths {
        StationPaths::under(&self.stations_root, station_short_name)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| Error::Configuration("Could not find config directory".to_string()))?
            .join("harbormaster");

        Ok(config_dir.join("config.toml"))
    }
}
