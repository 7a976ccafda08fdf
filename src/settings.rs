//! Engine settings
//!
//! Read from a JSON file next to the saves; anything missing or unreadable
//! falls back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};

/// Largest grid the engine accepts
pub const MAX_GRID_SIZE: usize = 26;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name shown as the winner when the player wins
    pub player_name: String,
    /// Grid dimension for new matches
    pub grid_size: usize,
    /// Delay before the opponent answers a player attack (0 = next advance)
    pub opponent_delay_ms: u64,
    /// Auto-clicker cadence
    pub auto_click_interval_ms: u64,
    /// Fixed RNG seed (otherwise the host picks one)
    pub seed: Option<u64>,
    /// Directory for save and leaderboard files
    pub save_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            grid_size: DEFAULT_GRID_SIZE,
            opponent_delay_ms: DEFAULT_OPPONENT_DELAY_MS,
            auto_click_interval_ms: DEFAULT_AUTO_CLICK_INTERVAL_MS,
            seed: None,
            save_dir: None,
        }
    }
}

impl Settings {
    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }

    pub fn auto_click_interval(&self) -> Duration {
        Duration::from_millis(self.auto_click_interval_ms)
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        let largest_ship = FLEET.iter().copied().max().unwrap_or(0);
        if self.grid_size < largest_ship || self.grid_size > MAX_GRID_SIZE {
            return Err(GameError::InvalidSettings(format!(
                "grid_size must be between {largest_ship} and {MAX_GRID_SIZE}, got {}",
                self.grid_size
            )));
        }
        if self.auto_click_interval_ms == 0 {
            return Err(GameError::InvalidSettings(
                "auto_click_interval_ms must be positive".to_string(),
            ));
        }
        if self.player_name.trim().is_empty() {
            return Err(GameError::InvalidSettings(
                "player_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring settings in {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Write settings to a file as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
