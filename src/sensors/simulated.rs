//! # Simulated Sensors
//!
//! Deterministic stand-ins for the environmental sensor, IMU and fuel gauge,
//! used by the host binary and the integration tests. Each source can be told
//! to fail in the ways real hardware does.

use tracing::debug;

use super::{
    AccelSettings, EnvironmentalSource, GyroSettings, InertialSource, PowerSource, SensorBus,
    SensorSuite,
};
use crate::telemetry::Vector3;

/// Standard sea-level pressure in Pa
const SEA_LEVEL_PA: f32 = 101_325.0;

/// Bus with nothing to bring up
#[derive(Debug, Default)]
pub struct SimulatedBus;

impl SensorBus for SimulatedBus {
    fn begin(&mut self) {
        debug!("Simulated sensor bus up");
    }
}

/// Environmental sensor drifting slowly around room conditions
#[derive(Debug, Clone)]
pub struct SimulatedEnvironment {
    present: bool,
    address: u8,
    samples: u32,
}

impl SimulatedEnvironment {
    pub fn new() -> Self {
        Self {
            present: true,
            address: 0,
            samples: 0,
        }
    }

    /// `begin()` reports the device missing
    #[must_use]
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

impl Default for SimulatedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentalSource for SimulatedEnvironment {
    fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    fn begin(&mut self) -> bool {
        self.present
    }

    fn read_temperature_c(&mut self) -> f32 {
        self.samples = self.samples.wrapping_add(1);
        22.0 + (self.samples % 50) as f32 * 0.02
    }

    fn read_humidity_percent(&mut self) -> f32 {
        45.0 + (self.samples % 20) as f32 * 0.1
    }

    fn read_pressure_pa(&mut self) -> f32 {
        SEA_LEVEL_PA - (self.samples % 100) as f32
    }
}

/// IMU sitting level under 1 g with a slow yaw rate
#[derive(Debug, Clone)]
pub struct SimulatedImu {
    present: bool,
    reset_polls_needed: Option<u32>,
    reset_polls: u32,
    fail_every: Option<u32>,
    fetches: u32,
    accel: Option<AccelSettings>,
    gyro: Option<GyroSettings>,
}

impl SimulatedImu {
    pub fn new() -> Self {
        Self {
            present: true,
            reset_polls_needed: Some(3),
            reset_polls: 0,
            fail_every: None,
            fetches: 0,
            accel: None,
            gyro: None,
        }
    }

    /// `begin()` reports the device missing
    #[must_use]
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    /// Reset-complete status never becomes true
    #[must_use]
    pub fn stuck_in_reset(mut self) -> Self {
        self.reset_polls_needed = None;
        self
    }

    /// Every `n`th sample fetch fails on the bus
    #[must_use]
    pub fn failing_every(mut self, n: u32) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    /// Whether the configuration step ran after reset
    pub fn is_configured(&self) -> bool {
        self.accel.is_some() && self.gyro.is_some()
    }
}

impl Default for SimulatedImu {
    fn default() -> Self {
        Self::new()
    }
}

impl InertialSource for SimulatedImu {
    fn begin(&mut self) -> bool {
        self.present
    }

    fn reset(&mut self) {
        self.reset_polls = 0;
        self.accel = None;
        self.gyro = None;
    }

    fn reset_complete(&mut self) -> bool {
        self.reset_polls += 1;
        self.reset_polls_needed
            .is_some_and(|needed| self.reset_polls >= needed)
    }

    fn configure_device(&mut self) {}

    fn configure_accel(&mut self, settings: &AccelSettings) {
        self.accel = Some(*settings);
    }

    fn configure_gyro(&mut self, settings: &GyroSettings) {
        self.gyro = Some(*settings);
    }

    fn read_accel(&mut self) -> Option<Vector3> {
        self.fetches = self.fetches.wrapping_add(1);
        if let Some(n) = self.fail_every {
            if self.fetches % n == 0 {
                return None;
            }
        }
        let wobble = (self.fetches % 10) as f32;
        Some(Vector3::new(wobble, -wobble, 1000.0))
    }

    fn read_gyro(&mut self) -> Option<Vector3> {
        // milli-degrees per second
        Some(Vector3::new(0.0, 0.0, 1500.0))
    }
}

/// Fuel gauge discharging a single-cell LiPo one step per read
#[derive(Debug, Clone)]
pub struct SimulatedBattery {
    present: bool,
    alert_threshold: Option<u8>,
    samples: u32,
}

impl SimulatedBattery {
    pub fn new() -> Self {
        Self {
            present: true,
            alert_threshold: None,
            samples: 0,
        }
    }

    /// `begin()` reports the device missing
    #[must_use]
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn alert_threshold(&self) -> Option<u8> {
        self.alert_threshold
    }
}

impl Default for SimulatedBattery {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for SimulatedBattery {
    fn begin(&mut self) -> bool {
        self.present
    }

    fn set_alert_threshold(&mut self, percent: u8) {
        self.alert_threshold = Some(percent);
    }

    fn read_voltage(&mut self) -> f32 {
        self.samples = self.samples.wrapping_add(1);
        (4.2 - self.samples as f32 * 0.0001).max(3.0)
    }

    fn read_state_of_charge(&mut self) -> f32 {
        (100.0 - self.samples as f32 * 0.01).max(0.0)
    }
}

/// All three simulated sensors on a simulated bus
pub fn simulated_suite() -> SensorSuite {
    SensorSuite {
        bus: Box::new(SimulatedBus),
        environmental: Box::new(SimulatedEnvironment::new()),
        inertial: Box::new(SimulatedImu::new()),
        power: Box::new(SimulatedBattery::new()),
    }
}
