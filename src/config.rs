//! Configuration management for touchgrid
//!
//! Handles loading, parsing and validation of the YAML tracker configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::tracker::{Platform, DEFAULT_CAPACITY, MAX_CAPACITY};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Maximum number of simultaneous contacts
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Platform profile of the touch source
    #[serde(default)]
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quirks: Option<QuirksConfig>,
}

/// Per-quirk overrides of the platform profile
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QuirksConfig {
    /// Treat a Move whose position equals its previous position as a Down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replayed_release_as_move: Option<bool>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            platform: Platform::default(),
            quirks: None,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from file with validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: TrackerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            anyhow::bail!("capacity must be at least 1");
        }
        if self.capacity > MAX_CAPACITY {
            anyhow::bail!(
                "capacity {} exceeds the maximum of {}",
                self.capacity,
                MAX_CAPACITY
            );
        }
        Ok(())
    }

    /// Effective replayed-release handling: explicit override, else platform profile
    pub fn replayed_release_as_move(&self) -> bool {
        self.quirks
            .as_ref()
            .and_then(|q| q.replayed_release_as_move)
            .unwrap_or_else(|| self.platform.replays_release_as_move())
    }
}

fn default_capacity() -> usize { DEFAULT_CAPACITY }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_mapping() {
        let config: TrackerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(!config.replayed_release_as_move());
    }

    #[test]
    fn test_platform_drives_quirk() {
        let config: TrackerConfig = serde_yaml::from_str("platform: android").unwrap();
        assert!(config.replayed_release_as_move());

        let config: TrackerConfig = serde_yaml::from_str(
            "platform: android\nquirks:\n  replayed_release_as_move: false\n",
        )
        .unwrap();
        assert!(!config.replayed_release_as_move());

        let config: TrackerConfig =
            serde_yaml::from_str("platform: ios\nquirks:\n  replayed_release_as_move: true\n")
                .unwrap();
        assert!(config.replayed_release_as_move());
    }

    #[test]
    fn test_validate_capacity() {
        let mut config = TrackerConfig::default();
        assert!(config.validate().is_ok());

        config.capacity = 0;
        assert!(config.validate().is_err());

        config.capacity = MAX_CAPACITY + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let config = TrackerConfig {
            capacity: 5,
            platform: Platform::Android,
            quirks: Some(QuirksConfig {
                replayed_release_as_move: Some(false),
            }),
        };

        config.save(file.path()).unwrap();
        let loaded = TrackerConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "capacity: 500\n").unwrap();
        assert!(TrackerConfig::load(file.path()).is_err());

        fs::write(file.path(), "platform: windows\n").unwrap();
        assert!(TrackerConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }
}
