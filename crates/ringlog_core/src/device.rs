//! The shared log device.
//!
//! A [`Device`] bundles the record ring and the write assembler behind one
//! exclusive lock. It is created once with [`Device::new`], shared as an
//! `Arc<Device>` with every front-end that needs it, and torn down once with
//! [`Device::close`]. Per-handle state lives in [`Session`].

use crate::assembler::WriteAssembler;
use crate::config::LogConfig;
use crate::error::{LogError, LogResult};
use crate::record::Record;
use crate::ring::RingStore;
use crate::session::Session;
use crate::stats::{DeviceStats, StatsSnapshot};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A cancellation flag for blocked lock acquisition.
///
/// Cloning shares the flag. While it is raised, an operation that has to
/// wait for the device lock gives up with [`LogError::Interrupted`] instead
/// of blocking; an uncontended lock is still taken.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Creates a lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Lowers the flag.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Returns true if the flag is raised.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// State guarded by the device lock.
pub(crate) struct DeviceState {
    pub(crate) store: RingStore,
    pub(crate) assembler: WriteAssembler,
    open: bool,
}

/// A bounded record log shared by any number of sessions.
///
/// # Thread Safety
///
/// Every read, write and seek holds the device lock for its whole duration,
/// including the copy into or out of the caller's buffer. The lock is a
/// scoped guard and is released on every exit path.
///
/// # Example
///
/// ```rust
/// use ringlog_core::{Device, LogConfig};
/// use std::io::{Read, Write};
///
/// let device = Device::new(LogConfig::new().capacity(2)).unwrap();
/// let mut writer = device.open();
/// writer.write_all(b"ab\ncd\nef\n").unwrap();
///
/// let mut reader = device.open();
/// let mut out = String::new();
/// reader.read_to_string(&mut out).unwrap();
/// assert_eq!(out, "cd\nef\n");
/// ```
pub struct Device {
    config: LogConfig,
    state: Mutex<DeviceState>,
    stats: DeviceStats,
}

impl Device {
    /// Creates a device with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the capacity is zero.
    pub fn new(config: LogConfig) -> LogResult<Arc<Self>> {
        let store = RingStore::with_capacity(config.capacity)?;
        let assembler = WriteAssembler::from_config(&config);
        info!(
            capacity = config.capacity,
            max_pending = config.max_pending_bytes,
            "log device initialized"
        );
        Ok(Arc::new(Self {
            config,
            state: Mutex::new(DeviceState {
                store,
                assembler,
                open: true,
            }),
            stats: DeviceStats::new(),
        }))
    }

    /// Opens a new session positioned at offset 0.
    #[must_use]
    pub fn open(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self))
    }

    /// Returns the device configuration.
    #[must_use]
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Returns a snapshot of the device counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns true until [`Device::close`] has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Appends bytes to the log.
    ///
    /// Every terminator in the assembled bytes commits one record; trailing
    /// unterminated bytes stay pending and are invisible to readers. Returns
    /// `bytes.len()` on success.
    ///
    /// # Errors
    ///
    /// - `Interrupted` if `interrupt` was raised while waiting for the lock
    /// - `ResourceExhausted` if the pending cap would be exceeded
    /// - `Closed` after [`Device::close`]
    pub fn write(&self, bytes: &[u8], interrupt: Option<&Interrupt>) -> LogResult<usize> {
        let mut state = self.lock(interrupt)?;
        let records = state.assembler.feed(bytes)?;

        for record in records {
            let size = record.len();
            if let Some(evicted) = state.store.insert(record) {
                debug!(size = evicted.len(), "evicted oldest record");
                self.stats.record_eviction(evicted.len() as u64);
            }
            self.stats.record_commit();
            debug!(
                size,
                live = state.store.len(),
                total_bytes = state.store.total_bytes(),
                "record committed"
            );
        }

        self.stats.record_write(bytes.len() as u64);
        Ok(bytes.len())
    }

    /// Returns the number of bytes in the live stream.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`Device::close`].
    pub fn total_bytes(&self) -> LogResult<u64> {
        Ok(self.lock(None)?.store.total_bytes())
    }

    /// Returns the number of live records.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`Device::close`].
    pub fn live_records(&self) -> LogResult<usize> {
        Ok(self.lock(None)?.store.len())
    }

    /// Returns the number of unterminated bytes held.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`Device::close`].
    pub fn pending_bytes(&self) -> LogResult<usize> {
        Ok(self.lock(None)?.assembler.pending_len())
    }

    /// Copies the whole live stream, oldest record first.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`Device::close`].
    pub fn contents(&self) -> LogResult<Vec<u8>> {
        Ok(self.lock(None)?.store.to_vec())
    }

    /// Clones the live records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`Device::close`].
    pub fn records(&self) -> LogResult<Vec<Record>> {
        Ok(self.lock(None)?.store.iter().cloned().collect())
    }

    /// Tears the device down.
    ///
    /// Releases every live record and any partial write, then rejects all
    /// further operations with `Closed`.
    ///
    /// # Errors
    ///
    /// Returns `Closed` if the device was already closed.
    pub fn close(&self) -> LogResult<()> {
        let mut state = self.lock(None)?;
        let released = state.store.drain();
        let released_bytes: usize = released.iter().map(|r| r.len()).sum();
        let dropped = state.assembler.clear();
        state.open = false;
        drop(state);

        info!(
            records = released.len(),
            bytes = released_bytes,
            pending = dropped,
            "log device closed"
        );
        Ok(())
    }

    /// Acquires the device lock.
    ///
    /// Without an interrupt this blocks. With one, a contended lock is polled
    /// every `lock_poll_interval` and the attempt is abandoned as soon as the
    /// flag is raised.
    pub(crate) fn lock(&self, interrupt: Option<&Interrupt>) -> LogResult<MutexGuard<'_, DeviceState>> {
        let guard = match interrupt {
            None => self.state.lock(),
            Some(interrupt) => match self.state.try_lock() {
                Some(guard) => guard,
                None => loop {
                    if interrupt.is_triggered() {
                        self.stats.record_interrupt();
                        return Err(LogError::Interrupted);
                    }
                    if let Some(guard) = self.state.try_lock_for(self.config.lock_poll_interval) {
                        break guard;
                    }
                },
            },
        };

        if !guard.open {
            return Err(LogError::Closed);
        }
        Ok(guard)
    }

    pub(crate) fn record_read(&self, bytes: usize) {
        self.stats.record_read(bytes as u64);
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
