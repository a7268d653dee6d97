// src/config.rs
//! Configuration stored as JSON under the user's config directory

use crate::{
    error::{Result, TrackerError},
    location::{
        filter::{DEFAULT_MIN_DISTANCE_METERS, DEFAULT_MIN_INTERVAL},
        LocationSource, UpdateFilter,
    },
    trip::engine::DEFAULT_MAX_PLAUSIBLE_SPEED_MPS,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub source_type: String, // "serial", "gpsd"
    pub serial_port: Option<String>,
    pub serial_baudrate: Option<u32>,
    pub gpsd_host: Option<String>,
    pub gpsd_port: Option<u16>,
    pub min_distance_meters: f64,
    pub min_interval_ms: u64,
    /// `None` disables the GPS glitch guard
    pub max_plausible_speed_mps: Option<f64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            source_type: "gpsd".to_string(),
            serial_port: None,
            serial_baudrate: Some(9600),
            gpsd_host: Some("localhost".to_string()),
            gpsd_port: Some(2947),
            min_distance_meters: DEFAULT_MIN_DISTANCE_METERS,
            min_interval_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
            max_plausible_speed_mps: Some(DEFAULT_MAX_PLAUSIBLE_SPEED_MPS),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| TrackerError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to the config file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TrackerError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|e| TrackerError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get config file path
    fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| TrackerError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config").join("ride-tracker").join("config.json"))
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.source_type = "serial".to_string();
        self.serial_port = Some(port);
        self.serial_baudrate = Some(baudrate);
    }

    /// Update gpsd settings
    pub fn update_gpsd(&mut self, host: String, port: u16) {
        self.source_type = "gpsd".to_string();
        self.gpsd_host = Some(host);
        self.gpsd_port = Some(port);
    }

    /// Resolve the configured location source
    pub fn location_source(&self) -> Result<LocationSource> {
        match self.source_type.as_str() {
            "serial" => {
                let port = self
                    .serial_port
                    .clone()
                    .ok_or_else(|| TrackerError::Config("serial source needs a port".to_string()))?;
                Ok(LocationSource::Serial {
                    port,
                    baudrate: self.serial_baudrate.unwrap_or(9600),
                })
            }
            "gpsd" => Ok(LocationSource::Gpsd {
                host: self.gpsd_host.clone().unwrap_or_else(|| "localhost".to_string()),
                port: self.gpsd_port.unwrap_or(2947),
            }),
            other => Err(TrackerError::Config(format!("unknown source type '{}'", other))),
        }
    }

    pub fn update_filter(&self) -> UpdateFilter {
        UpdateFilter::new(self.min_distance_meters, Duration::from_millis(self.min_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.source_type, "gpsd");
        assert_eq!(config.min_distance_meters, 1.0);
        assert_eq!(config.min_interval_ms, 1000);
        assert_eq!(
            config.location_source().unwrap(),
            LocationSource::Gpsd {
                host: "localhost".to_string(),
                port: 2947
            }
        );
    }

    #[test]
    fn test_update_serial() {
        let mut config = TrackerConfig::default();
        config.update_serial("/dev/ttyUSB0".to_string(), 115200);
        assert_eq!(config.source_type, "serial");
        assert_eq!(
            config.location_source().unwrap(),
            LocationSource::Serial {
                port: "/dev/ttyUSB0".to_string(),
                baudrate: 115200
            }
        );
    }

    #[test]
    fn test_serial_without_port() {
        let mut config = TrackerConfig::default();
        config.source_type = "serial".to_string();
        assert!(matches!(config.location_source(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_unknown_source() {
        let mut config = TrackerConfig::default();
        config.source_type = "carrier-pigeon".to_string();
        assert!(config.location_source().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"source_type":"gpsd","gpsd_port":3000}"#).unwrap();
        assert_eq!(config.gpsd_port, Some(3000));
        assert_eq!(config.min_interval_ms, 1000);
        assert_eq!(config.max_plausible_speed_mps, Some(50.0));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("ride-tracker-test-{}", std::process::id()))
            .join("config.json");

        let mut config = TrackerConfig::default();
        config.update_gpsd("10.0.0.2".to_string(), 2948);
        config.max_plausible_speed_mps = None;
        config.save_to(&path).unwrap();

        let loaded = TrackerConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
