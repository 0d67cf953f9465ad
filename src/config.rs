use crate::playback::PlaybackConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Longest accepted playback duration
const MAX_PLAYBACK_SECS: f64 = 3600.0;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Identifier entered for the last session
    pub username: String,
    pub playback_secs: f64,
    pub countdown_secs: u64,
    pub tick_rate: u32,
    /// Where submissions are stored; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
    /// Fixed seed for generated trajectories, for reproducible runs
    pub trajectory_seed: Option<u64>,
    pub show_canvas: bool,
    pub show_controls: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            playback_secs: 10.0,
            countdown_secs: 3,
            tick_rate: 60,
            storage_dir: None,
            trajectory_seed: None,
            show_canvas: true,
            show_controls: true,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pursuit").join("settings.json"))
    }

    /// Load settings from the platform config dir, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring settings at {}: {:#}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse settings")
    }

    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Storage directory for submissions
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pursuit")
                .join("storage")
        })
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        let duration = Duration::try_from_secs_f64(self.playback_secs.clamp(0.0, MAX_PLAYBACK_SECS))
            .unwrap_or_else(|_| {
                warn!("Invalid playback duration {}, using default", self.playback_secs);
                PlaybackConfig::default().duration
            });

        PlaybackConfig {
            duration,
            countdown: Duration::from_secs(self.countdown_secs),
            tick_rate: self.tick_rate.max(1),
        }
    }
}
