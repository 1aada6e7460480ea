use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};

// Default configuration
pub const DEFAULT_BADGE_THROTTLE_MS: u64 = 1000;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Logged-in username, used for "is this me" checks
    pub username: String,
    pub following: Vec<String>,
    /// Mobile shows the full profile on author click; desktop shows a popup
    pub is_mobile: bool,
    pub badge_throttle_ms: u64,
    /// `tracing` filter used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            following: vec![],
            is_mobile: false,
            badge_throttle_ms: DEFAULT_BADGE_THROTTLE_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn badge_throttle(&self) -> Duration {
        Duration::from_millis(self.badge_throttle_ms)
    }
}

pub fn settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("io", "keybase", "kbchat-view").ok_or(Error::NoConfigDir)?;
    let dir = proj.config_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.join("settings.json"))
}

/// Load settings from `path`; a missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

/// Load settings from the platform config directory, falling back to the
/// defaults if anything goes wrong.
pub fn load_settings() -> Settings {
    match settings_path().and_then(|path| load_settings_from(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    let mut file = fs::File::create(path)?;
    let data = serde_json::to_string_pretty(settings)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path()?, settings)
}
