//! Device statistics.
//!
//! Counters are atomic so they can be read without taking the device lock.
//!
//! ```rust
//! use ringlog_core::{Device, LogConfig};
//! use std::io::Write;
//!
//! let device = Device::new(LogConfig::default()).unwrap();
//! let mut session = device.open();
//! session.write_all(b"hello\n").unwrap();
//!
//! let stats = device.stats();
//! assert_eq!(stats.commits, 1);
//! assert_eq!(stats.evictions, 0);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for a log device.
#[derive(Debug, Default)]
pub struct DeviceStats {
    /// Write calls accepted.
    writes: AtomicU64,
    /// Bytes accepted by write calls.
    bytes_written: AtomicU64,
    /// Read calls served.
    reads: AtomicU64,
    /// Bytes returned by read calls.
    bytes_read: AtomicU64,
    /// Records committed to the ring.
    commits: AtomicU64,
    /// Records evicted from the ring.
    evictions: AtomicU64,
    /// Bytes released by eviction.
    evicted_bytes: AtomicU64,
    /// Lock acquisitions abandoned because of an interrupt.
    interrupts: AtomicU64,
}

impl DeviceStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self, bytes: u64) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        self.evicted_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of records committed.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Returns the number of records evicted.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            commits: self.commits(),
            evictions: self.evictions(),
            evicted_bytes: self.evicted_bytes.load(Ordering::Relaxed),
            interrupts: self.interrupts.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`DeviceStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Write calls accepted.
    pub writes: u64,
    /// Bytes accepted by write calls.
    pub bytes_written: u64,
    /// Read calls served.
    pub reads: u64,
    /// Bytes returned by read calls.
    pub bytes_read: u64,
    /// Records committed to the ring.
    pub commits: u64,
    /// Records evicted from the ring.
    pub evictions: u64,
    /// Bytes released by eviction.
    pub evicted_bytes: u64,
    /// Lock acquisitions abandoned because of an interrupt.
    pub interrupts: u64,
}
