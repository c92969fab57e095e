//! # CSV Encoding
//!
//! Header lines, data rows and the session filename used by the persistent
//! logger. The same row text is written to the card and mirrored to the
//! console.
//!
//! ## Row Layout
//!
//! ```text
//! Time(s),Temp(C),Humidity(%),Pressure(Pa),AccelX(mg),AccelY(mg),AccelZ(mg),
//! AccelTotal(mg),GyroX(dps),GyroY(dps),GyroZ(dps),BattVolt(V),BattPercent(%)
//! ```
//!
//! Decimal places per column: 1, 2, 1, 0, 1, 1, 1, 1, 2, 2, 2, 3, 1.
//! Halves round away from zero (`0.25` prints as `0.3`), matching the
//! flight computer's serial console output.

use std::fmt::Write;

use super::record::TelemetryRecord;

/// First header line (free-text title)
pub const HEADER_TITLE: &str = "# ROCKET DATA LOG";

/// Second header line (column names)
pub const HEADER_COLUMNS: &str = "# Time(s),Temp(C),Humidity(%),Pressure(Pa),AccelX(mg),AccelY(mg),AccelZ(mg),AccelTotal(mg),GyroX(dps),GyroY(dps),GyroZ(dps),BattVolt(V),BattPercent(%)";

/// Number of fields in every data row
pub const COLUMN_COUNT: usize = 13;

/// Decimal places for each column, in row order
pub const COLUMN_PRECISION: [usize; COLUMN_COUNT] = [1, 2, 1, 0, 1, 1, 1, 1, 2, 2, 2, 3, 1];

/// Build the session filename from milliseconds since boot
///
/// # Examples
///
/// ```
/// use flight_logger::telemetry::csv::session_filename;
///
/// assert_eq!(session_filename(4521), "DATA_004521.CSV");
/// ```
#[must_use]
pub fn session_filename(boot_millis: u64) -> String {
    format!("DATA_{:06}.CSV", boot_millis)
}

/// Both header lines, newline-terminated
#[must_use]
pub fn header() -> String {
    format!("{}\n{}\n", HEADER_TITLE, HEADER_COLUMNS)
}

/// Format one data row (without line terminator)
///
/// # Arguments
///
/// * `elapsed_s` - Seconds since boot
/// * `record` - Snapshot to encode
///
/// # Examples
///
/// ```
/// use flight_logger::telemetry::csv::format_row;
/// use flight_logger::telemetry::TelemetryRecord;
///
/// let row = format_row(1.5, &TelemetryRecord::default());
/// assert_eq!(row, "1.5,0.00,0.0,0,0.0,0.0,0.0,0.0,0.00,0.00,0.00,0.000,0.0");
/// ```
#[must_use]
pub fn format_row(elapsed_s: f32, record: &TelemetryRecord) -> String {
    let values = [
        elapsed_s,
        record.temperature_c,
        record.humidity_percent,
        record.pressure_pa,
        record.accel_x_mg,
        record.accel_y_mg,
        record.accel_z_mg,
        record.accel_total_mg,
        record.gyro_x_dps,
        record.gyro_y_dps,
        record.gyro_z_dps,
        record.battery_voltage_v,
        record.battery_percent,
    ];

    let mut row = String::with_capacity(128);
    for (i, (value, precision)) in values.iter().zip(COLUMN_PRECISION).enumerate() {
        if i > 0 {
            row.push(',');
        }
        // Normalize -0.0 so it prints as "0"
        let value = if *value == 0.0 { 0.0 } else { *value };
        let _ = write!(row, "{:.*}", precision, round_half_away(value, precision));
    }
    row
}

/// Round to `precision` decimals with ties away from zero
///
/// `{:.N}` alone rounds exact ties to even, so it is applied to the
/// pre-rounded value only to pad the decimals.
fn round_half_away(value: f32, precision: usize) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (f64::from(value) * scale).round() / scale
}
