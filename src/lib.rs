//! # Flight Logger Library
//!
//! Telemetry acquisition and on-device persistence for a small rocket
//! flight computer.
//!
//! This library samples an environmental sensor, an IMU and a battery fuel
//! gauge into a `TelemetryRecord`, then appends each record as a CSV row to a
//! session file on the SD card, optionally mirroring rows to a console.

pub mod clock;
pub mod config;
pub mod error;
pub mod logger;
pub mod sensors;
pub mod storage;
pub mod telemetry;
