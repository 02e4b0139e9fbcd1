//! Log device configuration.

use std::time::Duration;

/// Number of record slots kept by default.
pub const DEFAULT_CAPACITY: usize = 10;

/// Byte that terminates a record.
pub const DEFAULT_TERMINATOR: u8 = b'\n';

/// Default cap on unterminated bytes held by the write assembler.
pub const DEFAULT_MAX_PENDING_BYTES: usize = 1024 * 1024;

/// Configuration for a log device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Number of record slots. The oldest record is evicted once this is exceeded.
    pub capacity: usize,

    /// Byte that closes a record.
    pub terminator: u8,

    /// Maximum number of bytes a partial write may accumulate.
    pub max_pending_bytes: usize,

    /// How long an interruptible lock attempt waits before checking its
    /// interrupt flag again.
    pub lock_poll_interval: Duration,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            terminator: DEFAULT_TERMINATOR,
            max_pending_bytes: DEFAULT_MAX_PENDING_BYTES,
            lock_poll_interval: Duration::from_millis(10),
        }
    }
}

impl LogConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of record slots.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the record terminator byte.
    #[must_use]
    pub const fn terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets the cap on unterminated bytes.
    #[must_use]
    pub const fn max_pending_bytes(mut self, max: usize) -> Self {
        self.max_pending_bytes = max;
        self
    }

    /// Sets the poll interval used by interruptible lock acquisition.
    #[must_use]
    pub const fn lock_poll_interval(mut self, interval: Duration) -> Self {
        self.lock_poll_interval = interval;
        self
    }
}
