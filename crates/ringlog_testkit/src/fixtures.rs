//! Test fixtures for devices and data files.

use ringlog_core::{Device, LogConfig};
use ringlog_server::FileSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A shared device for tests.
pub struct TestDevice {
    /// The device instance.
    pub device: Arc<Device>,
}

impl TestDevice {
    /// Creates an empty device with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(LogConfig::new().capacity(capacity))
    }

    /// Creates an empty device from a full configuration.
    pub fn with_config(config: LogConfig) -> Self {
        Self {
            device: Device::new(config).expect("Failed to create device"),
        }
    }

    /// Creates a device and writes each line with a trailing newline.
    pub fn with_lines(capacity: usize, lines: &[&str]) -> Self {
        let fixture = Self::new(capacity);
        for line in lines {
            fixture
                .device
                .write(format!("{line}\n").as_bytes(), None)
                .expect("Failed to write line");
        }
        fixture
    }

    /// Returns a second handle to the device.
    pub fn shared(&self) -> Arc<Device> {
        Arc::clone(&self.device)
    }
}

impl std::ops::Deref for TestDevice {
    type Target = Arc<Device>;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

/// A data file path inside a temporary directory.
pub struct TestDataFile {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestDataFile {
    /// Reserves a path; the file itself is not created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            path: temp_dir.path().join("aesdsocketdata"),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a file sink on the path.
    pub fn sink(&self) -> FileSink {
        FileSink::open(&self.path).expect("Failed to open file sink")
    }

    /// Reads the file, or `None` if it does not exist.
    pub fn read(&self) -> Option<Vec<u8>> {
        std::fs::read(&self.path).ok()
    }
}

impl Default for TestDataFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the expected stream for the newest `capacity` of `lines`.
pub fn expected_stream(lines: &[&str], capacity: usize) -> Vec<u8> {
    let skip = lines.len().saturating_sub(capacity);
    lines[skip..]
        .iter()
        .flat_map(|line| format!("{line}\n").into_bytes())
        .collect()
}
