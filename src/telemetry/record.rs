//! # Telemetry Record
//!
//! One snapshot of every sensor reading plus the per-subsystem health flags.
//!
//! ## Units
//!
//! | Field                    | Unit          |
//! |--------------------------|---------------|
//! | temperature              | °C            |
//! | humidity                 | % RH          |
//! | pressure                 | Pa            |
//! | acceleration (and total) | milli-g       |
//! | angular rate             | degrees / s   |
//! | battery voltage          | V             |
//! | battery charge           | %             |

/// Marker stored in a field that could not be read this cycle
pub const SENTINEL: f32 = -999.0;

/// Three-axis sample as returned by the inertial sensor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the three axes
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One telemetry snapshot
///
/// Lives inside the acquisition manager for the whole session and is
/// overwritten in place every cycle; nothing is accumulated across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryRecord {
    // Environmental
    pub temperature_c: f32,
    pub humidity_percent: f32,
    pub pressure_pa: f32,

    // Inertial
    pub accel_x_mg: f32,
    pub accel_y_mg: f32,
    pub accel_z_mg: f32,
    pub accel_total_mg: f32,
    pub gyro_x_dps: f32,
    pub gyro_y_dps: f32,
    pub gyro_z_dps: f32,

    // Power
    pub battery_voltage_v: f32,
    pub battery_percent: f32,

    // Health flags, latched at initialization
    pub environmental_ok: bool,
    pub inertial_ok: bool,
    pub battery_ok: bool,
}

impl TelemetryRecord {
    /// Zero every measurement field, keeping the health flags
    pub fn clear_measurements(&mut self) {
        *self = Self {
            environmental_ok: self.environmental_ok,
            inertial_ok: self.inertial_ok,
            battery_ok: self.battery_ok,
            ..Self::default()
        };
    }

    /// Store one accelerometer (milli-g) and one gyroscope (milli-dps) sample
    pub fn set_inertial(&mut self, accel_mg: Vector3, gyro_mdps: Vector3) {
        self.accel_x_mg = accel_mg.x;
        self.accel_y_mg = accel_mg.y;
        self.accel_z_mg = accel_mg.z;
        self.accel_total_mg = accel_mg.magnitude();

        self.gyro_x_dps = gyro_mdps.x / 1000.0;
        self.gyro_y_dps = gyro_mdps.y / 1000.0;
        self.gyro_z_dps = gyro_mdps.z / 1000.0;
    }

    /// Mark all seven inertial fields unavailable
    pub fn set_inertial_unavailable(&mut self) {
        self.accel_x_mg = SENTINEL;
        self.accel_y_mg = SENTINEL;
        self.accel_z_mg = SENTINEL;
        self.accel_total_mg = SENTINEL;
        self.gyro_x_dps = SENTINEL;
        self.gyro_y_dps = SENTINEL;
        self.gyro_z_dps = SENTINEL;
    }

    pub fn set_environmental_unavailable(&mut self) {
        self.temperature_c = SENTINEL;
        self.humidity_percent = SENTINEL;
        self.pressure_pa = SENTINEL;
    }

    pub fn set_battery_unavailable(&mut self) {
        self.battery_voltage_v = SENTINEL;
        self.battery_percent = SENTINEL;
    }

    /// Accel X/Y/Z, accel total, gyro X/Y/Z
    #[must_use]
    pub fn inertial_fields(&self) -> [f32; 7] {
        [
            self.accel_x_mg,
            self.accel_y_mg,
            self.accel_z_mg,
            self.accel_total_mg,
            self.gyro_x_dps,
            self.gyro_y_dps,
            self.gyro_z_dps,
        ]
    }

    /// True when every inertial field carries the sentinel
    #[must_use]
    pub fn inertial_unavailable(&self) -> bool {
        self.inertial_fields().iter().all(|&v| v == SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_zeroed() {
        let record = TelemetryRecord::default();
        assert_eq!(record.temperature_c, 0.0);
        assert_eq!(record.inertial_fields(), [0.0; 7]);
        assert!(!record.environmental_ok);
        assert!(!record.inertial_ok);
        assert!(!record.battery_ok);
    }

    #[test]
    fn test_clear_measurements_keeps_health_flags() {
        let mut record = TelemetryRecord {
            temperature_c: 21.0,
            accel_z_mg: 1000.0,
            battery_voltage_v: 4.1,
            environmental_ok: true,
            inertial_ok: false,
            battery_ok: true,
            ..TelemetryRecord::default()
        };

        record.clear_measurements();

        assert_eq!(record.temperature_c, 0.0);
        assert_eq!(record.accel_z_mg, 0.0);
        assert_eq!(record.battery_voltage_v, 0.0);
        assert!(record.environmental_ok);
        assert!(!record.inertial_ok);
        assert!(record.battery_ok);
    }

    #[test]
    fn test_set_inertial_converts_gyro_and_computes_total() {
        let mut record = TelemetryRecord::default();
        record.set_inertial(
            Vector3::new(100.0, -50.0, 980.0),
            Vector3::new(1000.0, -2000.0, 500.0),
        );

        assert_eq!(record.gyro_x_dps, 1.0);
        assert_eq!(record.gyro_y_dps, -2.0);
        assert_eq!(record.gyro_z_dps, 0.5);

        let expected = (100.0f32 * 100.0 + 50.0 * 50.0 + 980.0 * 980.0).sqrt();
        assert!((record.accel_total_mg - expected).abs() < 1e-3);
        assert!(!record.inertial_unavailable());
    }

    #[test]
    fn test_set_inertial_unavailable_marks_all_seven() {
        let mut record = TelemetryRecord::default();
        record.set_inertial(Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
        record.set_inertial_unavailable();

        assert_eq!(record.inertial_fields(), [SENTINEL; 7]);
        assert!(record.inertial_unavailable());
    }

    #[test]
    fn test_magnitude_of_zero_vector() {
        assert_eq!(Vector3::default().magnitude(), 0.0);
    }

    #[test]
    fn test_record_is_copied_by_value() {
        let mut original = TelemetryRecord::default();
        let snapshot = original;
        original.temperature_c = 30.0;
        assert_eq!(original.temperature_c, 30.0);
        assert_eq!(snapshot.temperature_c, 0.0);
    }
}
