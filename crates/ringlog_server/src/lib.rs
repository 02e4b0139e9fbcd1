//! # Ringlog Server
//!
//! TCP line logger on top of the ring log.
//!
//! This crate provides:
//! - A tokio accept loop with a bounded number of concurrent connections
//! - Line framing with echo of the stored stream
//! - The in-band `AESDCHAR_IOCSEEKTO:X,Y` record seek command
//! - An optional periodic timestamp writer
//!
//! # Sinks
//!
//! Received lines go to a [`LogSink`]. Two are provided: [`DeviceSink`]
//! keeps the most recent records in a ring log device, and [`FileSink`]
//! appends to a data file that is removed on shutdown.
//!
//! ```rust,no_run
//! use ringlog_server::{LogServer, ServerConfig, DEFAULT_DATA_FILE};
//!
//! # async fn run() -> ringlog_server::ServerResult<()> {
//! let config = ServerConfig::default().with_file_sink(DEFAULT_DATA_FILE);
//! LogServer::new(config)?.run().await
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod server;
mod sink;

pub use config::{ServerConfig, SinkKind, DEFAULT_DATA_FILE, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{parse_command, Command, ConnectionHandler, SEEKTO_PREFIX};
pub use server::{format_timestamp, shutdown_signal, LogServer};
pub use sink::{open_sink, run_blocking, DeviceSink, FileSink, LogSink};
