//! Spectator settings with persistence
//!
//! Settings are saved to `~/.config/followcam/config.json` unless a path is
//! given on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use followcam_core::SpectatorConfig;

/// The config document and where it lives
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    pub config: SpectatorConfig,
}

impl Settings {
    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("followcam").join("config.json"))
    }

    /// Load settings from disk, or return defaults if missing or unreadable
    pub fn load(path: PathBuf) -> Self {
        let config = if !path.exists() {
            info!("No settings file found, using defaults");
            SpectatorConfig::default()
        } else {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => {
                        info!("Loaded settings from {:?}", path);
                        config
                    }
                    Err(e) => {
                        warn!("Failed to parse settings: {}, using defaults", e);
                        SpectatorConfig::default()
                    }
                },
                Err(e) => {
                    warn!("Failed to read settings file: {}, using defaults", e);
                    SpectatorConfig::default()
                }
            }
        };

        Self { path, config }
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(&self.config).context("Failed to serialize settings")?;
        fs::write(&self.path, content).context("Failed to write settings file")?;
        info!("Saved settings to {:?}", self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
