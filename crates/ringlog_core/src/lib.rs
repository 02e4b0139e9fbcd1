//! # ringlog Core
//!
//! A bounded, append-oriented record log addressed as one byte stream.
//!
//! Producers append newline-terminated records. Once the configured number
//! of record slots is used up, each new record evicts the oldest one.
//! Readers see the live records concatenated oldest first and can also seek
//! straight to "record N, byte K".
//!
//! This crate provides:
//! - [`RingStore`]: the fixed-capacity ring with offset translation
//! - [`WriteAssembler`]: assembly of partial writes into records
//! - [`Device`]: the lock-guarded shared log
//! - [`Session`]: per-handle cursor implementing `Read`, `Write` and `Seek`
//!
//! ## Example
//!
//! ```rust
//! use ringlog_core::{Device, LogConfig};
//!
//! let device = Device::new(LogConfig::new().capacity(3)).unwrap();
//! let mut session = device.open();
//! session.write(b"aa\n").unwrap();
//! session.write(b"bbbb\n").unwrap();
//!
//! session.seek_to(1, 2).unwrap();
//! let mut buf = [0u8; 10];
//! let n = session.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"bb\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod assembler;
mod config;
mod device;
mod error;
mod record;
mod ring;
mod session;
mod stats;

pub use assembler::WriteAssembler;
pub use config::{LogConfig, DEFAULT_CAPACITY, DEFAULT_MAX_PENDING_BYTES, DEFAULT_TERMINATOR};
pub use device::{Device, Interrupt};
pub use error::{LogError, LogResult};
pub use record::Record;
pub use ring::{Location, RingStore};
pub use session::{SeekState, Session};
pub use stats::{DeviceStats, StatsSnapshot};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
