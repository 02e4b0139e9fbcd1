//! Serve command implementation.

use super::{CliError, CliResult};
use ringlog_core::LogConfig;
use ringlog_server::{LogServer, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Options for the serve command.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Port to listen on.
    pub port: u16,
    /// Ring capacity for the device sink.
    pub capacity: usize,
    /// Use a data file instead of the device.
    pub data_file: Option<PathBuf>,
    /// Seconds between timestamp records, if any.
    pub timestamp_interval: Option<u64>,
}

impl ServeOptions {
    /// Builds the server configuration these options describe.
    pub fn to_config(&self) -> CliResult<ServerConfig> {
        if self.capacity == 0 {
            return Err(CliError::Usage("capacity must be at least 1".into()));
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let mut config = match &self.data_file {
            Some(path) => ServerConfig::new(addr).with_file_sink(path),
            None => ServerConfig::new(addr).with_device_sink(LogConfig::new().capacity(self.capacity)),
        };

        match self.timestamp_interval {
            Some(0) => return Err(CliError::Usage("timestamp interval must be positive".into())),
            Some(secs) => config = config.with_timestamp_interval(Duration::from_secs(secs)),
            None => {}
        }
        Ok(config)
    }
}

/// Runs the server in the foreground until SIGINT or SIGTERM.
pub fn run(options: &ServeOptions) -> CliResult<()> {
    let config = options.to_config()?;
    let server = LogServer::new(config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.run())?;
    Ok(())
}
