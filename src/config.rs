// Application configuration
// Loads the playlist and control tuning from a JSON file, falling back to
// the built-in playlist when no file exists.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::PlayerError;
use crate::player::playlist::{Playlist, VideoDescriptor};

const APP_DIR: &str = "webtv-player";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "webtv-player.log";

/// Overrides the config file location
pub const CONFIG_ENV: &str = "WEBTV_PLAYER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {0}")]
    Setting(String),
    #[error("invalid playlist: {0}")]
    Playlist(#[from] PlayerError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub playlist: Vec<VideoDescriptor>,
    /// Seconds skipped by the seek forward/back keys
    pub seek_step_secs: f64,
    /// Volume change per key press, in 0.0 - 1.0
    pub volume_step: f64,
    /// UI refresh and clock tick interval
    pub tick_millis: u64,
    /// Length of videos whose display duration can't be parsed
    pub default_length_secs: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            playlist: default_playlist(),
            seek_step_secs: 10.0,
            volume_step: 0.05,
            tick_millis: 100,
            default_length_secs: 60.0,
        }
    }
}

impl AppConfig {
    /// Loads from `$WEBTV_PLAYER_CONFIG` or the platform config directory.
    ///
    /// A missing file is not an error, the defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        info!(path = %path.display(), videos = config.playlist.len(), "loaded config");
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Log file location inside the platform data directory
    pub fn log_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join(LOG_FILE))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.seek_step_secs.is_finite() && self.seek_step_secs > 0.0) {
            return Err(ConfigError::Setting(format!("seekStepSecs = {}", self.seek_step_secs)));
        }
        if !(self.volume_step > 0.0 && self.volume_step <= 1.0) {
            return Err(ConfigError::Setting(format!("volumeStep = {}", self.volume_step)));
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Setting("tickMillis = 0".to_string()));
        }
        if !(self.default_length_secs.is_finite() && self.default_length_secs >= 0.0) {
            return Err(ConfigError::Setting(format!(
                "defaultLengthSecs = {}",
                self.default_length_secs
            )));
        }
        self.playlist()?;
        Ok(())
    }

    pub fn playlist(&self) -> Result<Playlist, ConfigError> {
        Ok(Playlist::new(self.playlist.clone())?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// The built-in playlist of local assets.
pub fn default_playlist() -> Vec<VideoDescriptor> {
    [
        ("video01", "Abertura", "00:45"),
        ("video02", "Jornal da Tarde", "03:12"),
        ("video03", "Previsão do Tempo", "01:30"),
        ("video04", "Encerramento", "00:58"),
    ]
    .into_iter()
    .map(|(id, title, duration)| {
        VideoDescriptor::new(
            id,
            title,
            format!("./assets/{}.mp4", id),
            format!("./assets/{}.jpg", id),
            duration,
        )
    })
    .collect()
}
