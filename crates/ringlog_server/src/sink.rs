//! Storage targets for received lines.

use crate::config::SinkKind;
use crate::error::{ServerError, ServerResult};
use parking_lot::Mutex;
use ringlog_core::{Device, LogError};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Where the server puts what clients send.
///
/// Sinks are opaque byte stores shared by every connection. Each call is
/// atomic with respect to the others.
///
/// Calls are synchronous and may block on a lock or on file I/O. Async code
/// goes through [`run_blocking`] so the runtime's worker threads are never
/// held.
pub trait LogSink: Send + Sync {
    /// Appends bytes received from a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be stored.
    fn append(&self, bytes: &[u8]) -> ServerResult<()>;

    /// Returns everything currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored bytes cannot be read.
    fn contents(&self) -> ServerResult<Vec<u8>>;

    /// Returns the stored stream starting at byte `offset` of record `ordinal`.
    ///
    /// # Errors
    ///
    /// Sinks without record addressing return `Unsupported`.
    fn read_from_record(&self, ordinal: u64, offset: u64) -> ServerResult<Vec<u8>> {
        let _ = (ordinal, offset);
        Err(ServerError::Unsupported("record seek".into()))
    }

    /// Releases the sink at shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if cleanup fails.
    fn close(&self) -> ServerResult<()>;
}

/// Runs one sink call on tokio's blocking pool.
///
/// # Errors
///
/// Returns the call's own error, or `Join` if the blocking task panicked.
pub async fn run_blocking<T, F>(sink: &Arc<dyn LogSink>, call: F) -> ServerResult<T>
where
    F: FnOnce(&dyn LogSink) -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let sink = Arc::clone(sink);
    tokio::task::spawn_blocking(move || call(sink.as_ref())).await?
}

/// Builds the sink described by a configuration.
///
/// # Errors
///
/// Returns an error if the device configuration is invalid or the data file
/// cannot be created.
pub fn open_sink(kind: &SinkKind) -> ServerResult<Arc<dyn LogSink>> {
    match kind {
        SinkKind::Device(log) => Ok(Arc::new(DeviceSink::new(Device::new(log.clone())?))),
        SinkKind::File(path) => Ok(Arc::new(FileSink::open(path)?)),
    }
}

/// A sink backed by a ring log device.
#[derive(Debug, Clone)]
pub struct DeviceSink {
    device: Arc<Device>,
}

impl DeviceSink {
    /// Wraps an existing device.
    pub fn new(device: Arc<Device>) -> Self {
        Self { device }
    }

    /// Returns the underlying device.
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl LogSink for DeviceSink {
    fn append(&self, bytes: &[u8]) -> ServerResult<()> {
        self.device.write(bytes, None)?;
        Ok(())
    }

    fn contents(&self) -> ServerResult<Vec<u8>> {
        Ok(self.device.contents()?)
    }

    fn read_from_record(&self, ordinal: u64, offset: u64) -> ServerResult<Vec<u8>> {
        let mut session = self.device.open();
        session.seek_to(ordinal, offset)?;

        let mut out = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = session.read(&mut buf)?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        Ok(out)
    }

    fn close(&self) -> ServerResult<()> {
        match self.device.close() {
            Ok(()) | Err(LogError::Closed) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// A sink backed by a plain file.
///
/// The file is truncated when opened and removed by [`LogSink::close`].
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Creates the data file, and its parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn open(path: &Path) -> ServerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        info!(path = %path.display(), "data file opened");
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Returns the path to the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn append(&self, bytes: &[u8]) -> ServerResult<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::End(0))?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(())
    }

    fn contents(&self) -> ServerResult<Vec<u8>> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(0))?;
        let mut out = Vec::new();
        file.read_to_end(&mut out)?;
        Ok(out)
    }

    fn close(&self) -> ServerResult<()> {
        let _file = self.file.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "data file removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlog_core::LogConfig;
    use tempfile::tempdir;

    fn device_sink(capacity: usize) -> DeviceSink {
        DeviceSink::new(Device::new(LogConfig::new().capacity(capacity)).unwrap())
    }

    #[test]
    fn device_sink_appends_and_evicts() {
        let sink = device_sink(2);
        sink.append(b"ab\n").unwrap();
        sink.append(b"cd\n").unwrap();
        sink.append(b"ef\n").unwrap();
        assert_eq!(sink.contents().unwrap(), b"cd\nef\n".to_vec());
    }

    #[test]
    fn device_sink_record_seek() {
        let sink = device_sink(3);
        sink.append(b"aa\nbbbb\n").unwrap();
        assert_eq!(sink.read_from_record(1, 2).unwrap(), b"bb\n".to_vec());

        let err = sink.read_from_record(5, 0).unwrap_err();
        assert!(matches!(err, ServerError::Log(LogError::OutOfRange { .. })));
    }

    #[test]
    fn device_sink_close_is_idempotent() {
        let sink = device_sink(2);
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(!sink.device().is_open());
    }

    #[test]
    fn file_sink_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data");

        let sink = FileSink::open(&path).unwrap();
        sink.append(b"one\n").unwrap();
        sink.append(b"two\n").unwrap();
        assert_eq!(sink.contents().unwrap(), b"one\ntwo\n".to_vec());
        assert!(path.exists());
    }

    #[test]
    fn file_sink_truncates_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, b"stale\n").unwrap();

        let sink = FileSink::open(&path).unwrap();
        assert!(sink.contents().unwrap().is_empty());
    }

    #[test]
    fn file_sink_close_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data");

        let sink = FileSink::open(&path).unwrap();
        sink.append(b"x\n").unwrap();
        sink.close().unwrap();
        assert!(!path.exists());
        sink.close().unwrap();
    }

    #[test]
    fn file_sink_has_no_record_seek() {
        let dir = tempdir().unwrap();
        let sink = FileSink::open(&dir.path().join("data")).unwrap();
        assert!(matches!(
            sink.read_from_record(0, 0),
            Err(ServerError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn blocking_calls_reach_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data");
        let sink: Arc<dyn LogSink> = Arc::new(FileSink::open(&path).unwrap());

        run_blocking(&sink, |s| s.append(b"one\n")).await.unwrap();
        let contents = run_blocking(&sink, |s| s.contents()).await.unwrap();
        assert_eq!(contents, b"one\n".to_vec());

        run_blocking(&sink, |s| s.close()).await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn open_sink_from_config() {
        let sink = open_sink(&SinkKind::Device(LogConfig::new().capacity(1))).unwrap();
        sink.append(b"a\nb\n").unwrap();
        assert_eq!(sink.contents().unwrap(), b"b\n".to_vec());
    }
}
