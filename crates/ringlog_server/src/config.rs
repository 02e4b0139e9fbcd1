//! Server configuration.

use ringlog_core::LogConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Port the daemon listens on by default.
pub const DEFAULT_PORT: u16 = 9000;

/// Data file used by the file sink by default.
pub const DEFAULT_DATA_FILE: &str = "/var/tmp/aesdsocketdata";

/// Where received lines are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    /// An in-memory ring log device.
    Device(LogConfig),
    /// A plain data file, removed on shutdown.
    File(PathBuf),
}

impl Default for SinkKind {
    fn default() -> Self {
        SinkKind::Device(LogConfig::default())
    }
}

/// Configuration for the log server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Size of each socket read.
    pub recv_buffer_size: usize,
    /// Longest line accepted per connection. Longer lines are discarded
    /// through their newline.
    pub max_line_bytes: usize,
    /// Storage for received lines.
    pub sink: SinkKind,
    /// Period of the timestamp writer, disabled when `None`.
    pub timestamp_interval: Option<Duration>,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_connections: 20,
            recv_buffer_size: 1024,
            max_line_bytes: 64 * 1024,
            sink: SinkKind::default(),
            timestamp_interval: None,
        }
    }

    /// Sets the maximum concurrent connections.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the socket read size.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Sets the per-connection line limit.
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    /// Stores lines in a ring log device.
    pub fn with_device_sink(mut self, log: LogConfig) -> Self {
        self.sink = SinkKind::Device(log);
        self
    }

    /// Stores lines in a plain data file.
    pub fn with_file_sink(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = SinkKind::File(path.into());
        self
    }

    /// Enables the periodic timestamp writer.
    pub fn with_timestamp_interval(mut self, interval: Duration) -> Self {
        self.timestamp_interval = Some(interval);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
