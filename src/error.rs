//! # Error Types
//!
//! Custom error types for the flight logger using `thiserror`.

use thiserror::Error;

/// Main error type for the flight logger
#[derive(Debug, Error)]
pub enum FlightLoggerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage device did not mount
    #[error("Storage mount failed (CS pin {cs_pin})")]
    StorageMount { cs_pin: u8 },

    /// Write/read/verify/delete round-trip against the card failed
    #[error("Storage self-test failed: {0}")]
    SelfTest(String),

    /// Session data file could not be created
    #[error("Could not create data file: {0}")]
    FileCreate(String),

    /// Session header could not be written
    #[error("Could not write header to {0}")]
    HeaderWrite(String),

    /// `begin()` was called on a logger that already left `Uninitialized`
    #[error("Logger already initialized")]
    AlreadyInitialized,
}

/// Result type alias for the flight logger
pub type Result<T> = std::result::Result<T, FlightLoggerError>;
