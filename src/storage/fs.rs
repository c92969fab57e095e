//! # Directory-Backed Storage
//!
//! `StorageDevice` over a host directory, standing in for the SD card root
//! when running off-target. Writes go through a `BufWriter`; `flush` pushes
//! them to the OS and calls `sync_data`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{FileHandle, OpenMode, StorageDevice};

/// Storage device rooted at a host directory
#[derive(Debug)]
pub struct FsStorage {
    root: PathBuf,
    mounted: bool,
}

impl FsStorage {
    /// # Arguments
    ///
    /// * `root` - Directory playing the card's root; created on `mount`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            mounted: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl StorageDevice for FsStorage {
    fn mount(&mut self, cs_pin: u8) -> bool {
        debug!("Mounting {} (CS pin {})", self.root.display(), cs_pin);

        match fs::create_dir_all(&self.root) {
            Ok(()) => {
                self.mounted = self.root.is_dir();
                self.mounted
            }
            Err(e) => {
                warn!("Failed to mount {}: {}", self.root.display(), e);
                false
            }
        }
    }

    fn open(&mut self, name: &str, mode: OpenMode) -> Option<Box<dyn FileHandle>> {
        if !self.mounted {
            return None;
        }

        let path = self.path_of(name);
        let result = match mode {
            OpenMode::Read => File::open(&path).map(FsFile::Reader),
            OpenMode::Write => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map(|file| FsFile::Writer(BufWriter::new(file))),
        };

        match result {
            Ok(file) => Some(Box::new(file)),
            Err(e) => {
                debug!("Failed to open {}: {}", path.display(), e);
                None
            }
        }
    }

    fn remove(&mut self, name: &str) -> bool {
        self.mounted && fs::remove_file(self.path_of(name)).is_ok()
    }
}

/// Open file on an `FsStorage`
#[derive(Debug)]
pub enum FsFile {
    Reader(File),
    Writer(BufWriter<File>),
}

fn wrong_mode(action: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("cannot {} a file opened in the other mode", action),
    )
}

impl FileHandle for FsFile {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            FsFile::Writer(writer) => writer.write_all(data),
            FsFile::Reader(_) => Err(wrong_mode("write")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FsFile::Writer(writer) => {
                writer.flush()?;
                writer.get_ref().sync_data()
            }
            FsFile::Reader(_) => Ok(()),
        }
    }

    fn read_to_string(&mut self) -> io::Result<String> {
        match self {
            FsFile::Reader(file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents)?;
                Ok(contents)
            }
            FsFile::Writer(_) => Err(wrong_mode("read")),
        }
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_before_mount_fails() {
        let dir = tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        assert!(storage.open("A.CSV", OpenMode::Write).is_none());
        assert!(!storage.remove("A.CSV"));
    }

    #[test]
    fn test_mount_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("card");
        let mut storage = FsStorage::new(&root);

        assert!(storage.mount(25));
        assert!(root.is_dir());
        assert_eq!(storage.root(), root.as_path());
    }

    #[test]
    fn test_mount_fails_when_root_is_a_file() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("not-a-dir");
        fs::write(&root, b"x").unwrap();

        let mut storage = FsStorage::new(&root);
        assert!(!storage.mount(25));
    }

    #[test]
    fn test_write_close_read_remove() {
        let dir = tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        assert!(storage.mount(25));

        let mut file = storage.open("TEST.TMP", OpenMode::Write).unwrap();
        file.write_all(b"TEST\n").unwrap();
        file.close().unwrap();

        let mut file = storage.open("TEST.TMP", OpenMode::Read).unwrap();
        assert_eq!(file.read_to_string().unwrap(), "TEST\n");
        file.close().unwrap();

        assert!(storage.remove("TEST.TMP"));
        assert!(!dir.path().join("TEST.TMP").exists());
        assert!(!storage.remove("TEST.TMP"));
    }

    #[test]
    fn test_write_mode_appends() {
        let dir = tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        assert!(storage.mount(25));

        for line in [&b"one\n"[..], &b"two\n"[..]] {
            let mut file = storage.open("LOG.CSV", OpenMode::Write).unwrap();
            file.write_all(line).unwrap();
            file.close().unwrap();
        }

        let contents = fs::read_to_string(dir.path().join("LOG.CSV")).unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }

    #[test]
    fn test_flush_makes_writes_visible() {
        let dir = tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        assert!(storage.mount(25));

        let mut file = storage.open("LOG.CSV", OpenMode::Write).unwrap();
        file.write_all(b"row\n").unwrap();
        file.flush().unwrap();

        let contents = fs::read_to_string(dir.path().join("LOG.CSV")).unwrap();
        assert_eq!(contents, "row\n");
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        assert!(storage.mount(25));
        assert!(storage.open("MISSING.TMP", OpenMode::Read).is_none());
    }

    #[test]
    fn test_mode_mismatch_is_an_error() {
        let dir = tempdir().unwrap();
        let mut storage = FsStorage::new(dir.path());
        assert!(storage.mount(25));

        let mut writer = storage.open("A.TMP", OpenMode::Write).unwrap();
        assert!(writer.read_to_string().is_err());
        writer.close().unwrap();

        let mut reader = storage.open("A.TMP", OpenMode::Read).unwrap();
        assert!(reader.write_all(b"x").is_err());
    }
}
