//! Mount adapter configuration.
//!
//! A small JSON config stored under `~/.mount_config/` by default. The
//! only required setting is the driver registry id naming which vendor
//! driver to instantiate; the rest tune the slew poll loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default slew poll interval in milliseconds.
const DEFAULT_IDLE_INTERVAL_MS: u64 = 200;

/// Default bound on the slew wait loop in seconds.
///
/// The reference implementation polled forever; an unresponsive driver
/// would block its caller indefinitely. This bound converts that hang
/// into a reported error.
const DEFAULT_SLEW_TIMEOUT_S: u64 = 120;

/// Errors from loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("HOME not set, cannot locate config directory")]
    NoHome,
}

/// Mount adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Driver registry id to instantiate (e.g. `"ScopeSim.Telescope"`).
    pub driver_id: String,
    /// Slew poll interval in milliseconds.
    pub idle_interval_ms: u64,
    /// Maximum time to wait for a slew to complete, in seconds.
    pub slew_timeout_s: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            driver_id: crate::sim::SIM_DRIVER_ID.to_string(),
            idle_interval_ms: DEFAULT_IDLE_INTERVAL_MS,
            slew_timeout_s: DEFAULT_SLEW_TIMEOUT_S,
        }
    }
}

impl MountConfig {
    /// Poll interval as a [`Duration`].
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Slew wait bound as a [`Duration`].
    pub fn slew_timeout(&self) -> Duration {
        Duration::from_secs(self.slew_timeout_s)
    }

    /// Default config file path (`~/.mount_config/mount.json`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
        Ok(PathBuf::from(home).join(".mount_config").join("mount.json"))
    }

    /// Load config from the default path, falling back to defaults if the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MountConfig::default();
        assert_eq!(config.driver_id, "ScopeSim.Telescope");
        assert_eq!(config.idle_interval(), Duration::from_millis(200));
        assert_eq!(config.slew_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mount.json");

        let config = MountConfig {
            driver_id: "EQMOD.Telescope".to_string(),
            idle_interval_ms: 50,
            slew_timeout_s: 30,
        };
        config.save_to(&path).unwrap();

        let loaded = MountConfig::load_from(&path).unwrap();
        assert_eq!(loaded.driver_id, "EQMOD.Telescope");
        assert_eq!(loaded.idle_interval_ms, 50);
        assert_eq!(loaded.slew_timeout_s, 30);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mount.json");
        std::fs::write(&path, r#"{"driver_id": "EQMOD.Telescope"}"#).unwrap();

        let loaded = MountConfig::load_from(&path).unwrap();
        assert_eq!(loaded.driver_id, "EQMOD.Telescope");
        assert_eq!(loaded.idle_interval_ms, 200);
    }
}
