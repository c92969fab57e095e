//! # Sensor Acquisition Manager
//!
//! Brings up the environmental, inertial and power subsystems and refreshes
//! one `TelemetryRecord` per cycle.
//!
//! ## Failure Reporting
//!
//! - Initialization failures latch a health flag to `false`; the remaining
//!   sensors are still initialized.
//! - A failed inertial fetch during a cycle writes the sentinel into all seven
//!   inertial fields. Environmental and battery values are forwarded as the
//!   driver returns them.
//! - Health flags do not gate reads unless `gate_reads_on_health` is set, so
//!   the two signals can disagree.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{AccelSettings, GyroSettings, SensorSuite};
use crate::clock::Clock;
use crate::config::SensorConfig;
use crate::telemetry::TelemetryRecord;

/// Owns the sensor handles and the session's telemetry record
pub struct SensorAcquisitionManager {
    sensors: SensorSuite,
    clock: Arc<dyn Clock>,
    config: SensorConfig,
    accel_settings: AccelSettings,
    gyro_settings: GyroSettings,
    record: TelemetryRecord,
}

impl std::fmt::Debug for SensorAcquisitionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorAcquisitionManager")
            .field("config", &self.config)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl SensorAcquisitionManager {
    /// Create a manager with the default IMU configuration
    ///
    /// # Arguments
    ///
    /// * `sensors` - Bus and sensor handles, owned for the session
    /// * `clock` - Delay source for reset polling and settle time
    /// * `config` - Bring-up and read policy
    pub fn new(sensors: SensorSuite, clock: Arc<dyn Clock>, config: SensorConfig) -> Self {
        Self {
            sensors,
            clock,
            config,
            accel_settings: AccelSettings::default(),
            gyro_settings: GyroSettings::default(),
            record: TelemetryRecord::default(),
        }
    }

    /// Override the accelerometer and gyroscope settings applied after reset
    #[must_use]
    pub fn with_imu_settings(mut self, accel: AccelSettings, gyro: GyroSettings) -> Self {
        self.accel_settings = accel;
        self.gyro_settings = gyro;
        self
    }

    /// Initialize the bus and every sensor
    ///
    /// Each sensor is attempted independently. The measurement fields of the
    /// record are zeroed afterwards whatever the outcome.
    pub fn begin(&mut self) {
        info!("Starting sensor initialization...");

        self.sensors.bus.begin();

        self.record.battery_ok = self.init_battery();
        self.record.environmental_ok = self.init_environmental();
        self.record.inertial_ok = self.init_inertial();

        self.record.clear_measurements();

        info!(
            "Sensor initialization complete (environmental: {}, inertial: {}, battery: {})",
            status(self.record.environmental_ok),
            status(self.record.inertial_ok),
            status(self.record.battery_ok),
        );
    }

    fn init_battery(&mut self) -> bool {
        info!("Initializing battery fuel gauge...");

        let power = &mut self.sensors.power;
        if !power.begin() {
            warn!("Battery fuel gauge not detected. Please check wiring.");
            return false;
        }

        power.set_alert_threshold(self.config.battery_alert_threshold);
        power.clear_alert();
        info!("Battery fuel gauge initialized successfully");
        true
    }

    fn init_environmental(&mut self) -> bool {
        info!("Initializing environmental sensor...");

        let environmental = &mut self.sensors.environmental;
        environmental.set_address(self.config.environmental_address);

        if !environmental.begin() {
            warn!(
                "Environmental sensor did not respond at 0x{:02X}. Please check address and wiring.",
                self.config.environmental_address
            );
            return false;
        }

        info!("Environmental sensor initialization successful");
        true
    }

    fn init_inertial(&mut self) -> bool {
        info!("Initializing inertial sensor...");

        if !self.sensors.inertial.begin() {
            warn!("Inertial sensor did not respond. Please check address and wiring.");
            return false;
        }

        info!("Inertial sensor responded. Resetting device settings...");
        self.sensors.inertial.reset();

        if !self.wait_for_reset() {
            error!(
                "Inertial sensor reset did not complete after {} polls",
                self.config.reset_timeout_polls
            );
            return false;
        }

        info!("Device reset complete. Configuring inertial sensor...");
        self.clock.delay_ms(self.config.reset_settle_ms);

        let inertial = &mut self.sensors.inertial;
        inertial.configure_device();
        inertial.configure_accel(&self.accel_settings);
        inertial.configure_gyro(&self.gyro_settings);

        info!("Inertial sensor successfully configured");
        true
    }

    /// Poll the reset-complete bit, bounded by `reset_timeout_polls`
    fn wait_for_reset(&mut self) -> bool {
        for poll in 0..self.config.reset_timeout_polls {
            if self.sensors.inertial.reset_complete() {
                debug!("Inertial reset completed after {} polls", poll + 1);
                return true;
            }
            self.clock.delay_ms(self.config.reset_poll_interval_ms);
        }
        false
    }

    /// Refresh the record: environmental, inertial, then battery
    pub fn read_all(&mut self) {
        self.read_environmental();
        self.read_inertial();
        self.read_battery();
    }

    fn read_environmental(&mut self) {
        if self.config.gate_reads_on_health && !self.record.environmental_ok {
            self.record.set_environmental_unavailable();
            return;
        }

        let environmental = &mut self.sensors.environmental;
        self.record.temperature_c = environmental.read_temperature_c();
        self.record.humidity_percent = environmental.read_humidity_percent();
        self.record.pressure_pa = environmental.read_pressure_pa();
    }

    fn read_inertial(&mut self) {
        if self.config.gate_reads_on_health && !self.record.inertial_ok {
            self.record.set_inertial_unavailable();
            return;
        }

        let inertial = &mut self.sensors.inertial;
        // Gyro is only fetched once the accel fetch succeeded
        let sample = inertial
            .read_accel()
            .and_then(|accel| inertial.read_gyro().map(|gyro| (accel, gyro)));

        match sample {
            Some((accel, gyro)) => self.record.set_inertial(accel, gyro),
            None => {
                debug!("Inertial fetch failed this cycle");
                self.record.set_inertial_unavailable();
            }
        }
    }

    fn read_battery(&mut self) {
        if self.config.gate_reads_on_health && !self.record.battery_ok {
            self.record.set_battery_unavailable();
            return;
        }

        let power = &mut self.sensors.power;
        self.record.battery_voltage_v = power.read_voltage();
        self.record.battery_percent = power.read_state_of_charge();
    }

    /// The current snapshot
    pub fn record(&self) -> &TelemetryRecord {
        &self.record
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "OK" } else { "ERR" }
}
