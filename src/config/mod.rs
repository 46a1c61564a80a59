// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SchedulerError;

/// Lower bound of the sensitivity slider.
pub const SENSITIVITY_MIN: f64 = 5.0;

/// Upper bound of the sensitivity slider.
pub const SENSITIVITY_MAX: f64 = 20.0;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated accelerometer)
    pub demo_mode: bool,

    /// Monitoring configuration
    pub monitor: MonitorConfig,

    /// Alarm configuration
    pub alarm: AlarmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "AlertWave".to_string(),
            log_level: "info".to_string(),
            demo_mode: true,
            monitor: MonitorConfig::default(),
            alarm: AlarmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            // Create parent directories
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("alertwave"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Check every policy value against its allowed range.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let mut probe = self.clone();
        probe.set_sensitivity(self.monitor.sensitivity_threshold)?;
        probe.set_offset_minutes(self.alarm.offset_minutes)?;
        probe.set_snooze_minutes(self.alarm.snooze_minutes)?;
        Ok(())
    }

    /// Update the magnitude threshold. Rejects values outside the slider
    /// range and keeps the prior value.
    pub fn set_sensitivity(&mut self, value: f64) -> Result<(), SchedulerError> {
        if !(SENSITIVITY_MIN..=SENSITIVITY_MAX).contains(&value) {
            return Err(SchedulerError::InvalidConfig(format!(
                "sensitivity {} outside allowed range {}..{}",
                value, SENSITIVITY_MIN, SENSITIVITY_MAX
            )));
        }
        self.monitor.sensitivity_threshold = value;
        Ok(())
    }

    /// Update the inactivity offset. Must be at least one minute.
    pub fn set_offset_minutes(&mut self, minutes: u32) -> Result<(), SchedulerError> {
        if minutes < 1 {
            return Err(SchedulerError::InvalidConfig(format!(
                "offset of {} minutes is below the 1 minute floor",
                minutes
            )));
        }
        self.alarm.offset_minutes = minutes;
        Ok(())
    }

    /// Update the snooze length. Must be at least one minute.
    pub fn set_snooze_minutes(&mut self, minutes: u32) -> Result<(), SchedulerError> {
        if minutes < 1 {
            return Err(SchedulerError::InvalidConfig(format!(
                "snooze of {} minutes is below the 1 minute floor",
                minutes
            )));
        }
        self.alarm.snooze_minutes = minutes;
        Ok(())
    }
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Magnitude threshold for the Moving state, in raw sensitivity units
    pub sensitivity_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensitivity_threshold: 10.0,
        }
    }
}

/// Alarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Minutes of confirmed quiet before an offset alarm is scheduled
    pub offset_minutes: u32,

    /// Minutes a snoozed alarm is pushed into the future
    pub snooze_minutes: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            offset_minutes: 5,
            snooze_minutes: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_sensitivity_rejected_keeps_prior_value() {
        let mut config = Config::default();
        assert!(config.set_sensitivity(4.9).is_err());
        assert!(config.set_sensitivity(20.1).is_err());
        assert_eq!(config.monitor.sensitivity_threshold, 10.0);

        assert!(config.set_sensitivity(15.0).is_ok());
        assert_eq!(config.monitor.sensitivity_threshold, 15.0);
    }

    #[test]
    fn test_zero_minute_offsets_rejected() {
        let mut config = Config::default();
        assert!(config.set_offset_minutes(0).is_err());
        assert!(config.set_snooze_minutes(0).is_err());
        assert_eq!(config.alarm.offset_minutes, 5);
        assert_eq!(config.alarm.snooze_minutes, 5);

        assert!(config.set_offset_minutes(1).is_ok());
        assert!(config.set_snooze_minutes(10).is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.monitor.sensitivity_threshold, 10.0);
        assert_eq!(back.alarm.offset_minutes, 5);
    }
}
