//! # Telemetry Module
//!
//! The per-cycle telemetry snapshot and its CSV encoding.
//!
//! This module handles:
//! - The `TelemetryRecord` shared between acquisition and persistence
//! - The "unavailable" sentinel for fields that could not be read
//! - CSV header lines, row formatting with fixed per-field precision
//! - The session filename pattern (`DATA_NNNNNN.CSV`)

pub mod record;
pub mod csv;

pub use record::{TelemetryRecord, Vector3, SENTINEL};
