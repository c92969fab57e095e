//! # Persistent Logger Module
//!
//! Owns the session's CSV file on the storage device and mirrors rows to a
//! console sink.
//!
//! This module handles:
//! - Card bring-up: chip-select settle, mount, write/read self-test
//! - Creating `DATA_NNNNNN.CSV` and writing its two-line header
//! - Appending one row per cycle, flushing every `flush_interval_rows` rows
//! - Mirroring rows (and a one-time header) to the console in debug mode
//!
//! ## State Machine
//!
//! ```text
//! Uninitialized --begin() ok--> Active
//! Uninitialized --begin() err-> Failed   (permanent for the session)
//! ```
//!
//! `log_data` is safe in every state; storage writes happen only while
//! `Active` with a valid file handle.

pub mod console;

pub use console::{ConsoleSink, StdoutConsole};

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::StorageConfig;
use crate::error::{FlightLoggerError, Result};
use crate::storage::{FileHandle, OpenMode, StorageDevice};
use crate::telemetry::csv::{format_row, header, session_filename, HEADER_COLUMNS, HEADER_TITLE};
use crate::telemetry::TelemetryRecord;

/// Scratch file used by the storage self-test
pub const SELF_TEST_FILE: &str = "TEST.TMP";

/// Text written to and expected back from the self-test file
pub const SELF_TEST_MARKER: &str = "TEST";

/// Logger lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Uninitialized,
    Active,
    Failed,
}

/// Session CSV logger
pub struct PersistentLogger {
    storage: Box<dyn StorageDevice>,
    console: Box<dyn ConsoleSink>,
    clock: Arc<dyn Clock>,
    config: StorageConfig,
    state: LoggerState,
    file: Option<Box<dyn FileHandle>>,
    filename: Option<String>,
    rows_written: u64,
    failed_writes: u64,
    console_header_printed: bool,
}

impl std::fmt::Debug for PersistentLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentLogger")
            .field("state", &self.state)
            .field("filename", &self.filename)
            .field("rows_written", &self.rows_written)
            .finish_non_exhaustive()
    }
}

impl PersistentLogger {
    /// # Arguments
    ///
    /// * `storage` - Card (or stand-in) the session file lives on
    /// * `console` - Destination for mirrored rows
    /// * `clock` - Time source for the settle delay and filename
    /// * `config` - Chip-select pin, settle time, flush interval
    pub fn new(
        storage: Box<dyn StorageDevice>,
        console: Box<dyn ConsoleSink>,
        clock: Arc<dyn Clock>,
        config: StorageConfig,
    ) -> Self {
        Self {
            storage,
            console,
            clock,
            config,
            state: LoggerState::Uninitialized,
            file: None,
            filename: None,
            rows_written: 0,
            failed_writes: 0,
            console_header_printed: false,
        }
    }

    /// Bring up the card and open the session file
    ///
    /// Only the first call does anything. On failure the logger is `Failed`
    /// for the rest of the session; `log_data` keeps mirroring to the console.
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized`: called a second time
    /// - `StorageMount`: card did not mount
    /// - `SelfTest`: write/read/verify/delete round-trip failed
    /// - `FileCreate`: session file could not be opened
    /// - `HeaderWrite`: header could not be written or flushed
    pub fn begin(&mut self) -> Result<()> {
        if self.state != LoggerState::Uninitialized {
            warn!("Logger begin() ignored: already {:?}", self.state);
            return Err(FlightLoggerError::AlreadyInitialized);
        }

        self.console_header_printed = false;

        match self.open_session() {
            Ok(()) => {
                self.state = LoggerState::Active;
                info!("SD logging is now ACTIVE");
                Ok(())
            }
            Err(e) => {
                self.state = LoggerState::Failed;
                error!("SD logging disabled for this session: {}", e);
                Err(e)
            }
        }
    }

    fn open_session(&mut self) -> Result<()> {
        let cs_pin = self.config.cs_pin;
        info!("Starting SD card initialization...");
        info!("Using CS pin: {}", cs_pin);

        // Cards mis-initialize if CS floats during mount
        self.storage.release_chip_select(cs_pin);
        self.clock.delay_ms(self.config.cs_settle_ms);

        if !self.storage.mount(cs_pin) {
            return Err(FlightLoggerError::StorageMount { cs_pin });
        }
        info!("SD card found");

        self.self_test()?;
        info!("SD card test passed");

        let filename = session_filename(self.clock.millis());
        info!("Creating file: {}", filename);

        let mut file = self
            .storage
            .open(&filename, OpenMode::Write)
            .ok_or_else(|| FlightLoggerError::FileCreate(filename.clone()))?;

        let written = file.write_all(header().as_bytes());
        if let Err(e) = written.and_then(|()| file.flush()) {
            let _ = file.close();
            return Err(FlightLoggerError::HeaderWrite(format!("{}: {}", filename, e)));
        }

        self.file = Some(file);
        self.filename = Some(filename);
        Ok(())
    }

    /// Write a marker to a scratch file, read it back, delete the file
    fn self_test(&mut self) -> Result<()> {
        let self_test_err =
            |step: &str, e: std::io::Error| FlightLoggerError::SelfTest(format!("{}: {}", step, e));

        let mut file = self
            .storage
            .open(SELF_TEST_FILE, OpenMode::Write)
            .ok_or_else(|| {
                FlightLoggerError::SelfTest(format!("could not create {}", SELF_TEST_FILE))
            })?;
        file.write_all(format!("{}\n", SELF_TEST_MARKER).as_bytes())
            .map_err(|e| self_test_err("write", e))?;
        file.close().map_err(|e| self_test_err("close", e))?;

        let mut file = self
            .storage
            .open(SELF_TEST_FILE, OpenMode::Read)
            .ok_or_else(|| {
                FlightLoggerError::SelfTest(format!("could not reopen {}", SELF_TEST_FILE))
            })?;
        let contents = file.read_to_string();
        let _ = file.close();
        let contents = contents.map_err(|e| self_test_err("read", e))?;

        if !self.storage.remove(SELF_TEST_FILE) {
            return Err(FlightLoggerError::SelfTest(format!(
                "could not remove {}",
                SELF_TEST_FILE
            )));
        }

        if !contents.contains(SELF_TEST_MARKER) {
            return Err(FlightLoggerError::SelfTest(format!(
                "read back {:?}, expected {:?}",
                contents.trim_end(),
                SELF_TEST_MARKER
            )));
        }

        debug!("Self-test round-trip verified");
        Ok(())
    }

    /// Append one row, and mirror it to the console when `debug_mode` is set
    ///
    /// # Arguments
    ///
    /// * `elapsed_s` - Seconds since boot
    /// * `record` - Snapshot to log
    /// * `debug_mode` - Also print the row to the console
    pub fn log_data(&mut self, elapsed_s: f32, record: &TelemetryRecord, debug_mode: bool) {
        let row = format_row(elapsed_s, record);

        if self.state == LoggerState::Active {
            self.append_row(&row);
        }

        if debug_mode {
            self.mirror_row(&row);
        }
    }

    fn append_row(&mut self, row: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let mut line = String::with_capacity(row.len() + 1);
        line.push_str(row);
        line.push('\n');

        // The handle stays open; the next cycle tries again
        if let Err(e) = file.write_all(line.as_bytes()) {
            self.failed_writes += 1;
            if self.failed_writes == 1 {
                warn!(
                    "Write to {} failed: {}; retrying on later rows",
                    self.filename.as_deref().unwrap_or("data file"),
                    e
                );
            }
            return;
        }

        if self.failed_writes > 0 {
            info!("Card writes recovered after {} dropped rows", self.failed_writes);
            self.failed_writes = 0;
        }

        self.rows_written += 1;
        let interval = u64::from(self.config.flush_interval_rows.max(1));
        if self.rows_written % interval == 0 {
            if let Err(e) = file.flush() {
                warn!("Flush after {} rows failed: {}", self.rows_written, e);
            }
        }
    }

    fn mirror_row(&mut self, row: &str) {
        if !self.console_header_printed {
            self.console.write_line(HEADER_TITLE);
            self.console.write_line(HEADER_COLUMNS);
            self.console_header_printed = true;
        }
        self.console.write_line(row);
    }

    /// Flush and close the session file; later rows go to the console only
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the final flush, if any
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.close()?;
            info!(
                "Closed {} after {} rows",
                self.filename.as_deref().unwrap_or("data file"),
                self.rows_written
            );
        }
        Ok(())
    }

    pub fn state(&self) -> LoggerState {
        self.state
    }

    /// True while rows are reaching the card
    pub fn is_logging(&self) -> bool {
        self.state == LoggerState::Active && self.file.is_some()
    }

    /// Session file name once `begin()` succeeded
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Rows appended to the file this session
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl Drop for PersistentLogger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close data file on shutdown: {}", e);
        }
    }
}
