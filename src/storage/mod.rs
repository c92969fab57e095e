//! # Storage Module
//!
//! Trait abstraction over the block storage device (SD card) and its files,
//! so the logger can run against real cards, a host directory, or test mocks.

pub mod fs;

pub use fs::FsStorage;

use std::io;

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create if missing, append otherwise
    Write,
}

/// An open file on the storage device
///
/// `write_all` may be buffered by the device; only `flush` and `close`
/// guarantee the bytes reached the medium.
pub trait FileHandle: Send {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn read_to_string(&mut self) -> io::Result<String>;

    /// Flush and release the handle
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Block storage device holding a flat file namespace
pub trait StorageDevice: Send {
    /// Drive the chip-select line idle-high ahead of `mount`
    fn release_chip_select(&mut self, _cs_pin: u8) {}

    /// Returns true when the card is present and mounted
    fn mount(&mut self, cs_pin: u8) -> bool;

    /// `None` when the file cannot be opened in `mode`
    fn open(&mut self, name: &str, mode: OpenMode) -> Option<Box<dyn FileHandle>>;

    /// Returns true when the file was deleted
    fn remove(&mut self, name: &str) -> bool;
}
