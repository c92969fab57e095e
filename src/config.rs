//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{FlightLoggerError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub sensors: SensorConfig,
    pub logging: LoggingConfig,
}

/// Storage (SD card) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory standing in for the card root on host builds
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    #[serde(default = "default_cs_pin")]
    pub cs_pin: u8,

    /// Delay after driving chip-select high, before mounting
    #[serde(default = "default_cs_settle_ms")]
    pub cs_settle_ms: u64,

    /// Rows appended between durability flushes
    #[serde(default = "default_flush_interval_rows")]
    pub flush_interval_rows: u32,
}

/// Sensor bring-up and read policy configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    /// Replace reads of subsystems that failed `begin()` with sentinels
    #[serde(default)]
    pub gate_reads_on_health: bool,

    #[serde(default = "default_reset_poll_interval_ms")]
    pub reset_poll_interval_ms: u64,

    /// Reset-complete polls before the IMU is declared failed
    #[serde(default = "default_reset_timeout_polls")]
    pub reset_timeout_polls: u32,

    /// Delay between reset completion and configuration
    #[serde(default = "default_reset_settle_ms")]
    pub reset_settle_ms: u64,

    #[serde(default = "default_environmental_address")]
    pub environmental_address: u8,

    /// Fuel gauge low-charge alert, percent
    #[serde(default = "default_battery_alert_threshold")]
    pub battery_alert_threshold: u8,
}

/// Sample loop and diagnostics configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Mirror every row to the console
    #[serde(default = "default_debug_mirror")]
    pub debug_mirror: bool,

    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Also write diagnostics to `<dir>/flight-logger.log`
    #[serde(default)]
    pub diagnostics_dir: Option<String>,
}

// Default value functions
fn default_root_dir() -> String { "./sdcard".to_string() }
fn default_cs_pin() -> u8 { 25 }
fn default_cs_settle_ms() -> u64 { 10 }
fn default_flush_interval_rows() -> u32 { 10 }

fn default_reset_poll_interval_ms() -> u64 { 1 }
fn default_reset_timeout_polls() -> u32 { 1000 }
fn default_reset_settle_ms() -> u64 { 100 }
fn default_environmental_address() -> u8 { 0x76 }
fn default_battery_alert_threshold() -> u8 { 20 }

fn default_debug_mirror() -> bool { true }
fn default_sample_interval_ms() -> u64 { 100 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            cs_pin: default_cs_pin(),
            cs_settle_ms: default_cs_settle_ms(),
            flush_interval_rows: default_flush_interval_rows(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            gate_reads_on_health: false,
            reset_poll_interval_ms: default_reset_poll_interval_ms(),
            reset_timeout_polls: default_reset_timeout_polls(),
            reset_settle_ms: default_reset_settle_ms(),
            environmental_address: default_environmental_address(),
            battery_alert_threshold: default_battery_alert_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug_mirror: default_debug_mirror(),
            sample_interval_ms: default_sample_interval_ms(),
            diagnostics_dir: None,
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> FlightLoggerError {
    FlightLoggerError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flight_logger::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.storage.root_dir.is_empty() {
            return Err(invalid("storage root_dir cannot be empty"));
        }

        if self.storage.cs_settle_ms > 1000 {
            return Err(invalid("cs_settle_ms must be between 0 and 1000"));
        }

        if self.storage.flush_interval_rows == 0 || self.storage.flush_interval_rows > 1000 {
            return Err(invalid("flush_interval_rows must be between 1 and 1000"));
        }

        if self.sensors.reset_poll_interval_ms == 0 || self.sensors.reset_poll_interval_ms > 1000 {
            return Err(invalid("reset_poll_interval_ms must be between 1 and 1000"));
        }

        if self.sensors.reset_timeout_polls == 0 {
            return Err(invalid("reset_timeout_polls must be greater than 0"));
        }

        if self.sensors.reset_settle_ms > 10000 {
            return Err(invalid("reset_settle_ms must be between 0 and 10000"));
        }

        // 7-bit I2C address space, excluding reserved ranges
        if self.sensors.environmental_address < 0x08 || self.sensors.environmental_address > 0x77 {
            return Err(invalid("environmental_address must be between 0x08 and 0x77"));
        }

        // MAX17048 alert register covers 1-32%
        if self.sensors.battery_alert_threshold == 0 || self.sensors.battery_alert_threshold > 32 {
            return Err(invalid("battery_alert_threshold must be between 1 and 32"));
        }

        if self.logging.sample_interval_ms == 0 || self.logging.sample_interval_ms > 60000 {
            return Err(invalid("sample_interval_ms must be between 1 and 60000"));
        }

        if let Some(dir) = &self.logging.diagnostics_dir {
            if dir.is_empty() {
                return Err(invalid("diagnostics_dir cannot be empty when set"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[storage]
root_dir = "/tmp/card"
flush_interval_rows = 5

[sensors]
gate_reads_on_health = true

[logging]
debug_mirror = false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.storage.root_dir, "/tmp/card");
        assert_eq!(config.storage.flush_interval_rows, 5);
        assert_eq!(config.storage.cs_pin, 25);
        assert!(config.sensors.gate_reads_on_health);
        assert!(!config.logging.debug_mirror);
        assert_eq!(config.logging.sample_interval_ms, 100);
    }

    #[test]
    fn test_load_rejects_missing_section() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[storage]\n[sensors]\n").unwrap();
        temp_file.flush().unwrap();

        match Config::load(temp_file.path()) {
            Err(FlightLoggerError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        match Config::load("/nonexistent/flight-logger.toml") {
            Err(FlightLoggerError::Io(_)) => {}
            other => panic!("Expected Io error, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\nflush_interval_rows = 0\n[sensors]\n[logging]\n")
            .unwrap();
        temp_file.flush().unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_empty_root_dir() {
        let mut config = create_valid_config();
        config.storage.root_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cs_settle_too_high() {
        let mut config = create_valid_config();
        config.storage.cs_settle_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flush_interval_zero() {
        let mut config = create_valid_config();
        config.storage.flush_interval_rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flush_interval_too_high() {
        let mut config = create_valid_config();
        config.storage.flush_interval_rows = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flush_interval_every_row() {
        let mut config = create_valid_config();
        config.storage.flush_interval_rows = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reset_poll_interval_zero() {
        let mut config = create_valid_config();
        config.sensors.reset_poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reset_timeout_polls_zero() {
        let mut config = create_valid_config();
        config.sensors.reset_timeout_polls = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reset_settle_too_high() {
        let mut config = create_valid_config();
        config.sensors.reset_settle_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environmental_address_out_of_range() {
        for address in [0x00, 0x07, 0x78, 0xFF] {
            let mut config = create_valid_config();
            config.sensors.environmental_address = address;
            assert!(config.validate().is_err(), "address 0x{:02X} should be invalid", address);
        }
    }

    #[test]
    fn test_environmental_alternate_address() {
        let mut config = create_valid_config();
        config.sensors.environmental_address = 0x77;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_battery_alert_threshold_bounds() {
        let mut config = create_valid_config();
        config.sensors.battery_alert_threshold = 0;
        assert!(config.validate().is_err());

        config.sensors.battery_alert_threshold = 33;
        assert!(config.validate().is_err());

        config.sensors.battery_alert_threshold = 32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_interval_zero() {
        let mut config = create_valid_config();
        config.logging.sample_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_interval_too_high() {
        let mut config = create_valid_config();
        config.logging.sample_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_diagnostics_dir() {
        let mut config = create_valid_config();
        config.logging.diagnostics_dir = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_root_dir(), "./sdcard");
        assert_eq!(default_cs_pin(), 25);
        assert_eq!(default_cs_settle_ms(), 10);
        assert_eq!(default_flush_interval_rows(), 10);
        assert_eq!(default_reset_poll_interval_ms(), 1);
        assert_eq!(default_reset_timeout_polls(), 1000);
        assert_eq!(default_reset_settle_ms(), 100);
        assert_eq!(default_environmental_address(), 0x76);
        assert_eq!(default_battery_alert_threshold(), 20);
        assert_eq!(default_debug_mirror(), true);
        assert_eq!(default_sample_interval_ms(), 100);
        assert!(!SensorConfig::default().gate_reads_on_health);
    }
}
