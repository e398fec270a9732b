//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the dose-planner.toml
//! file. It provides a centralized way to configure the default course length and the
//! daytime window applied to every generated schedule.
//!
//! ```toml
//! [schedule]
//! default_duration = "168h"
//!
//! [window]
//! first_hour = 8
//! last_hour = 21
//! grid_minutes = 15
//! ```

use crate::frequency::{parse_duration, DurationError};
use crate::schedule::{DayWindow, WindowError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "dose-planner.toml";

/// Errors raised when configured values cannot be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `schedule.default_duration` is not a valid duration string
    #[error("invalid default duration: {0}")]
    DefaultDuration(#[from] DurationError),

    /// `[window]` values do not form a usable daytime window
    #[error("invalid window: {0}")]
    Window(#[from] WindowError),

    /// Serializing the configuration failed
    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Writing the configuration file failed
    #[error("config IO: {0}")]
    Io(#[from] io::Error),
}

/// Application configuration loaded from dose-planner.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Schedule defaults
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Daytime window limits
    #[serde(default)]
    pub window: WindowConfig,
}

/// Defaults applied to incoming schedule requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Course length used when a request does not carry one (e.g. "168h", "7d")
    pub default_duration: String,
}

/// Wall-clock limits for takings; missing keys keep their defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Hour at which takings may start
    pub first_hour: u32,
    /// Last hour in which a taking may happen
    pub last_hour: u32,
    /// Takings are aligned to multiples of this many minutes
    pub grid_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            default_duration: "168h".to_string(), // one week
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        let day = DayWindow::default();
        WindowConfig {
            first_hour: day.first_hour(),
            last_hour: day.last_hour(),
            grid_minutes: day.grid_minutes(),
        }
    }
}

impl Config {
    /// Load configuration from dose-planner.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "invalid config file format, using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        tracing::info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// The configured daytime window, validated
    pub fn day_window(&self) -> Result<DayWindow, ConfigError> {
        let w = &self.window;
        Ok(DayWindow::new(w.first_hour, w.last_hour, w.grid_minutes)?)
    }

    /// The configured default course length, parsed
    pub fn default_duration(&self) -> Result<Duration, ConfigError> {
        Ok(parse_duration(&self.schedule.default_duration)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schedule.default_duration, "168h");
        assert_eq!(config.window.first_hour, 8);
        assert_eq!(config.window.last_hour, 21);
        assert_eq!(config.window.grid_minutes, 15);
        assert_eq!(config.day_window().unwrap(), DayWindow::default());
        assert_eq!(config.default_duration().unwrap(), Duration::days(7));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [schedule]
            default_duration = "3d"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.default_duration().unwrap(), Duration::days(3));
        assert_eq!(parsed.window, WindowConfig::default());
    }

    #[test]
    fn test_partial_window_table_keeps_other_keys() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            "[schedule]\ndefault_duration = \"2d\"\n\n[window]\nfirst_hour = 9\n",
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path());
        assert_eq!(config.window.first_hour, 9);
        assert_eq!(config.window.last_hour, 21);
        assert_eq!(config.window.grid_minutes, 15);
        assert_eq!(config.default_duration().unwrap(), Duration::days(2));
        assert_eq!(config.day_window().unwrap(), DayWindow::new(9, 21, 15).unwrap());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "window = 12").unwrap();

        let config = Config::load_from_path(temp_file.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();

        let mut config = Config::default();
        config.window.first_hour = 9;
        config.window.grid_minutes = 30;
        config.save_to_path(temp_file.path()).unwrap();

        let loaded = Config::load_from_path(temp_file.path());
        assert_eq!(loaded, config);
        assert_eq!(loaded.day_window().unwrap(), DayWindow::new(9, 21, 30).unwrap());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut config = Config::default();
        config.window.first_hour = 22;
        assert!(matches!(config.day_window(), Err(ConfigError::Window(_))));

        config.schedule.default_duration = "a week".to_string();
        assert!(matches!(
            config.default_duration(),
            Err(ConfigError::DefaultDuration(_))
        ));
    }
}
