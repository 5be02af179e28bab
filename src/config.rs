//! # Configuration Module
//!
//! Configuration is a plain value, [`AppConfig`], built once in `main` and
//! handed to the constructors that need it. There is no global instance.
//!
//! ## Storage
//!
//! The file lives in the platform-standard config directory:
//! - Linux: `~/.config/music-comment/config.json`
//! - macOS: `~/Library/Application Support/music-comment/config.json`
//! - Windows: `%APPDATA%\music-comment\config.json`
//!
//! Every field has a default and the file may set any subset of them. A
//! missing or malformed file falls back to the defaults.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::window::PLAYER_WINDOW_CLASS;

const APP_DIR: &str = "music-comment";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-appropriate configuration directory, creating it if
/// needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system config directory cannot be determined
/// - The subdirectory cannot be created due to permissions
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Please ensure your platform supports standard config directories."
        )
    })?;

    let app_dir = config_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create config directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Default location of the configuration file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Tunable knobs. Field names match the keys in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-request HTTP timeout, seconds.
    pub api_timeout: u64,
    /// Attempts per remote call, including the first.
    pub max_retries: u32,
    /// Minimum spacing between remote calls, seconds.
    pub min_request_interval: f64,
    /// Capacity of each lookup cache.
    pub cache_size: usize,
    /// Intended lifetime of cached comments, seconds. Not enforced.
    pub comment_cache_time: u64,
    /// How many genre tags the display shows.
    pub max_genre_tags: usize,
    /// Label shown when a song has no genre tags.
    pub default_genre: String,
    /// Seconds between window checks.
    pub poll_interval: u64,
    /// Window class of the player's main window.
    pub window_class: String,
    /// Comments printed per song by the console display.
    pub max_displayed_comments: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_timeout: 10,
            max_retries: 3,
            min_request_interval: 1.0,
            cache_size: 50,
            comment_cache_time: 3600,
            max_genre_tags: 3,
            default_genre: "未知风格".to_string(),
            poll_interval: 3,
            window_class: PLAYER_WINDOW_CLASS.to_string(),
            max_displayed_comments: 5,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file gives the defaults, and so does a
    /// file that isn't valid JSON (with a warning).
    ///
    /// # Errors
    ///
    /// Only when the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()));
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!(
                    "Config file {} is malformed, using defaults: {e}",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout.max(1))
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.min_request_interval).unwrap_or(Duration::ZERO)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.max(1))
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}
