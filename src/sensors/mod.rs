//! # Sensors Module
//!
//! Capability interfaces for the three sensor subsystems and the manager that
//! refreshes a `TelemetryRecord` from them.
//!
//! This module handles:
//! - Environmental (temperature / humidity / pressure) source trait
//! - Inertial (accelerometer + gyroscope) source trait with reset and configuration
//! - Power (battery fuel gauge) source trait
//! - Shared sensor bus bring-up
//! - Simulated sources for host runs and tests
//!
//! Vendor register programming stays inside the implementations; the enums
//! below are passed through to them unchanged.

pub mod manager;
pub mod simulated;

pub use manager::SensorAcquisitionManager;

use crate::telemetry::Vector3;

/// Shared I2C/SPI bus the sensors hang off
#[cfg_attr(test, mockall::automock)]
pub trait SensorBus: Send {
    /// Bring the bus up; called once before any sensor `begin()`
    fn begin(&mut self);
}

/// Temperature, humidity and pressure sensor
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentalSource: Send {
    /// Select the bus address before `begin()`
    fn set_address(&mut self, _address: u8) {}

    /// Returns true when the device answered and is configured
    fn begin(&mut self) -> bool;

    /// Degrees Celsius
    fn read_temperature_c(&mut self) -> f32;

    /// Percent relative humidity
    fn read_humidity_percent(&mut self) -> f32;

    /// Pascals
    fn read_pressure_pa(&mut self) -> f32;
}

/// Six-axis inertial measurement unit
#[cfg_attr(test, mockall::automock)]
pub trait InertialSource: Send {
    /// Returns true when the device answered
    fn begin(&mut self) -> bool;

    /// Issue a software reset
    fn reset(&mut self);

    /// Poll the reset-complete status bit
    fn reset_complete(&mut self) -> bool;

    /// Apply register auto-increment and block-data-update defaults
    fn configure_device(&mut self);

    fn configure_accel(&mut self, settings: &AccelSettings);

    fn configure_gyro(&mut self, settings: &GyroSettings);

    /// One accelerometer sample in milli-g, `None` on bus failure
    fn read_accel(&mut self) -> Option<Vector3>;

    /// One gyroscope sample in milli-degrees/second, `None` on bus failure
    fn read_gyro(&mut self) -> Option<Vector3>;
}

/// Battery fuel gauge
#[cfg_attr(test, mockall::automock)]
pub trait PowerSource: Send {
    /// Returns true when the device answered
    fn begin(&mut self) -> bool;

    /// Low state-of-charge alert threshold in percent
    fn set_alert_threshold(&mut self, _percent: u8) {}

    fn clear_alert(&mut self) {}

    /// Volts
    fn read_voltage(&mut self) -> f32;

    /// State of charge in percent
    fn read_state_of_charge(&mut self) -> f32;
}

/// Output data rate shared by accelerometer and gyroscope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDataRate {
    Hz12_5,
    Hz26,
    Hz52,
    Hz104,
    Hz208,
    Hz416,
    Hz833,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelFullScale {
    G2,
    G4,
    G8,
    G16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroFullScale {
    Dps125,
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
    Dps4000,
}

/// Accelerometer slope filter cutoff as a divisor of the output data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelSlopeFilter {
    OdrDiv4,
    OdrDiv10,
    OdrDiv20,
    OdrDiv45,
    OdrDiv100,
    OdrDiv200,
    OdrDiv400,
    OdrDiv800,
}

/// Gyroscope LP1 filter bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroBandwidth {
    UltraLight,
    VeryLight,
    Light,
    Medium,
    Strong,
    VeryStrong,
    Aggressive,
    Xtreme,
}

/// Accelerometer configuration applied after reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelSettings {
    pub data_rate: OutputDataRate,
    pub full_scale: AccelFullScale,
    /// Enable the LP2 low-pass stage
    pub lp2_filter: bool,
    pub slope_filter: AccelSlopeFilter,
}

impl Default for AccelSettings {
    fn default() -> Self {
        Self {
            data_rate: OutputDataRate::Hz104,
            full_scale: AccelFullScale::G4,
            lp2_filter: true,
            slope_filter: AccelSlopeFilter::OdrDiv100,
        }
    }
}

/// Gyroscope configuration applied after reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroSettings {
    pub data_rate: OutputDataRate,
    pub full_scale: GyroFullScale,
    /// Enable the LP1 low-pass stage
    pub lp1_filter: bool,
    pub bandwidth: GyroBandwidth,
}

impl Default for GyroSettings {
    fn default() -> Self {
        Self {
            data_rate: OutputDataRate::Hz104,
            full_scale: GyroFullScale::Dps500,
            lp1_filter: true,
            bandwidth: GyroBandwidth::Medium,
        }
    }
}

/// The full set of sensor handles owned by the acquisition manager
pub struct SensorSuite {
    pub bus: Box<dyn SensorBus>,
    pub environmental: Box<dyn EnvironmentalSource>,
    pub inertial: Box<dyn InertialSource>,
    pub power: Box<dyn PowerSource>,
}

impl std::fmt::Debug for SensorSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSuite").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accel_settings() {
        let settings = AccelSettings::default();
        assert_eq!(settings.data_rate, OutputDataRate::Hz104);
        assert_eq!(settings.full_scale, AccelFullScale::G4);
        assert!(settings.lp2_filter);
        assert_eq!(settings.slope_filter, AccelSlopeFilter::OdrDiv100);
    }

    #[test]
    fn test_default_gyro_settings() {
        let settings = GyroSettings::default();
        assert_eq!(settings.data_rate, OutputDataRate::Hz104);
        assert_eq!(settings.full_scale, GyroFullScale::Dps500);
        assert!(settings.lp1_filter);
        assert_eq!(settings.bandwidth, GyroBandwidth::Medium);
    }
}
