//! # Flight Logger
//!
//! Samples the flight computer's sensors and records every sample to a CSV
//! file on the SD card, mirroring rows to the console for debugging.
//!
//! On a host this runs against simulated sensors and a directory standing in
//! for the card (`storage.root_dir`).

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use flight_logger::clock::{Clock, SystemClock};
use flight_logger::config::{Config, LoggingConfig};
use flight_logger::logger::{PersistentLogger, StdoutConsole};
use flight_logger::sensors::simulated::simulated_suite;
use flight_logger::sensors::SensorAcquisitionManager;
use flight_logger::storage::FsStorage;

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Name of the diagnostics file inside `logging.diagnostics_dir`
const DIAGNOSTICS_FILE: &str = "flight-logger.log";

/// Number of cycles between status log messages
const STATUS_INTERVAL_CYCLES: u64 = 100;

/// Main entry point for the flight logger
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, else `config/default.toml`, else defaults)
///    - Set up tracing, optionally teeing diagnostics to a file
///    - Bring up sensors, then the SD logger; a failed card leaves console mirroring only
///
/// 2. **Main Loop**
///    - Every `sample_interval_ms`: refresh the record, then log it
///    - Status line every 100 cycles
///
/// 3. **Shutdown** on Ctrl+C
///    - Flush and close the session file
///
/// # Errors
///
/// Returns error if an explicitly given config file cannot be loaded, or if
/// the final flush of the session file fails.
#[tokio::main]
async fn main() -> Result<()> {
    let (config, source) = load_config()?;
    let _diagnostics_guard = init_tracing(&config.logging)?;

    info!("Flight Logger v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", source);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    let mut sensors =
        SensorAcquisitionManager::new(simulated_suite(), clock.clone(), config.sensors.clone());
    let mut logger = PersistentLogger::new(
        Box::new(FsStorage::new(&config.storage.root_dir)),
        Box::new(StdoutConsole),
        clock.clone(),
        config.storage.clone(),
    );

    if bring_up(&mut sensors, &mut logger).is_err() {
        warn!("Continuing without SD logging; rows go to the console only when debug_mirror is set");
    }

    let mut sample_interval = interval(Duration::from_millis(config.logging.sample_interval_ms));
    let debug_mirror = config.logging.debug_mirror;

    info!("Sampling every {} ms", config.logging.sample_interval_ms);
    info!("Press Ctrl+C to exit");

    let mut cycles: u64 = 0;

    loop {
        tokio::select! {
            _ = sample_interval.tick() => {
                sensors.read_all();
                logger.log_data(elapsed_seconds(clock.millis()), sensors.record(), debug_mirror);
                cycles += 1;

                if cycles % STATUS_INTERVAL_CYCLES == 0 {
                    info!("{} cycles, {} rows on card (logging: {})",
                        cycles, logger.rows_written(), logger.is_logging());
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    logger.close().context("closing data file")?;
    info!("Total cycles: {}, rows on card: {}", cycles, logger.rows_written());

    Ok(())
}

/// Load the config named on the command line, or the default file if present
fn load_config() -> Result<(Config, String)> {
    if let Some(path) = std::env::args().nth(1) {
        let config = Config::load(&path).with_context(|| format!("loading {}", path))?;
        return Ok((config, path));
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        let config = Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("loading {}", DEFAULT_CONFIG_PATH))?;
        return Ok((config, DEFAULT_CONFIG_PATH.to_string()));
    }

    Ok((Config::default(), "built-in defaults".to_string()))
}

/// Console diagnostics, plus a plain-text copy when `diagnostics_dir` is set
fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let Some(dir) = &config.diagnostics_dir else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, DIAGNOSTICS_FILE));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Ok(Some(guard))
}

/// Initialize sensors, then the SD logger
///
/// Both sleep through reset polls and settle delays, so the worker thread is
/// handed over to blocking work for the duration.
fn bring_up(
    sensors: &mut SensorAcquisitionManager,
    logger: &mut PersistentLogger,
) -> flight_logger::error::Result<()> {
    tokio::task::block_in_place(|| {
        sensors.begin();
        logger.begin()
    })
}

/// Milliseconds since boot to the seconds value stored in each row
fn elapsed_seconds(boot_millis: u64) -> f32 {
    (boot_millis as f64 / 1000.0) as f32
}
