//! CLI configuration management.
//!
//! Defaults, then the config file, then environment variables; command-line
//! flags are applied on top by each command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use cograph_layout::TickCadence;

/// Application-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout width used when neither the graph file nor a flag sets one.
    pub width: f64,

    /// Layout height used when neither the graph file nor a flag sets one.
    pub height: f64,

    /// Milliseconds between ticks in `stdio` mode. Zero ticks back-to-back.
    pub tick_ms: u64,

    /// Write every Nth tick in `run` mode.
    pub emit_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            tick_ms: 16,
            emit_every: 1,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        // Try to load from config file
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path).with_context(|| {
                    format!("Failed to read config from {}", config_path.display())
                })?;
                config = serde_json::from_str(&contents)
                    .with_context(|| "Failed to parse config file")?;
            }
        }

        // Environment variables take precedence over the file
        if let Some(width) = env_parse("COGRAPH_WIDTH")? {
            config.width = width;
        }
        if let Some(height) = env_parse("COGRAPH_HEIGHT")? {
            config.height = height;
        }
        if let Some(tick_ms) = env_parse("COGRAPH_TICK_MS")? {
            config.tick_ms = tick_ms;
        }

        Ok(config)
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "cograph", "cograph")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Tick cadence for a live session.
    pub fn cadence(&self) -> TickCadence {
        cadence_from_millis(self.tick_ms)
    }
}

/// `0` means back-to-back ticks.
pub fn cadence_from_millis(ms: u64) -> TickCadence {
    if ms == 0 {
        TickCadence::Immediate
    } else {
        TickCadence::Interval(Duration::from_millis(ms))
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", key, value)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"tick_ms": 0}"#).unwrap();
        assert_eq!(config.tick_ms, 0);
        assert_eq!(config.width, 960.0);
        assert_eq!(config.cadence(), TickCadence::Immediate);
    }

    #[test]
    fn test_cadence_from_millis() {
        assert_eq!(
            cadence_from_millis(20),
            TickCadence::Interval(Duration::from_millis(20))
        );
    }
}
