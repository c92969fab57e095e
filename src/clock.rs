//! # Clock Module
//!
//! Monotonic millisecond time source used for elapsed time, settle delays,
//! reset polling, and the session filename.

use std::time::{Duration, Instant};

/// Monotonic millisecond clock
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since boot
    fn millis(&self) -> u64;

    /// Block the calling thread for `ms` milliseconds
    fn delay_ms(&self, ms: u64);
}

/// Clock backed by `std::time::Instant`, starting at construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    boot: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }

    fn delay_ms(&self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
