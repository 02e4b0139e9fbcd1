//! Error types for ring log operations.

use std::io;
use thiserror::Error;

/// Result type for ring log operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur while reading, writing or seeking the log.
///
/// Expected misses such as end of stream are not errors: reads return
/// `Ok(0)` and lookups on [`crate::RingStore`] return `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    /// A record seek addressed data that is not live.
    #[error("record {ordinal} offset {offset} is out of range")]
    OutOfRange {
        /// Requested record ordinal (0 = oldest live record).
        ordinal: u64,
        /// Requested byte offset within the record.
        offset: u64,
    },

    /// Lock acquisition was interrupted; the operation can be retried.
    #[error("interrupted while waiting for the log lock")]
    Interrupted,

    /// An argument was malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// Memory for the operation could not be obtained.
    #[error("resource exhausted: needed {requested} bytes, limit {limit}")]
    ResourceExhausted {
        /// Bytes the operation needed.
        requested: usize,
        /// The limit that was hit.
        limit: usize,
    },

    /// The device has been closed.
    #[error("log device is closed")]
    Closed,
}

impl LogError {
    /// Creates an out-of-range error.
    pub fn out_of_range(ordinal: u64, offset: u64) -> Self {
        Self::OutOfRange { ordinal, offset }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a resource exhausted error.
    pub fn resource_exhausted(requested: usize, limit: usize) -> Self {
        Self::ResourceExhausted { requested, limit }
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LogError::Interrupted)
    }
}

impl From<LogError> for io::Error {
    fn from(err: LogError) -> Self {
        let kind = match &err {
            LogError::OutOfRange { .. } | LogError::InvalidArgument { .. } => {
                io::ErrorKind::InvalidInput
            }
            LogError::Interrupted => io::ErrorKind::Interrupted,
            LogError::ResourceExhausted { .. } => io::ErrorKind::OutOfMemory,
            LogError::Closed => io::ErrorKind::NotConnected,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_interrupted_is_retryable() {
        assert!(LogError::Interrupted.is_retryable());
        assert!(!LogError::out_of_range(1, 2).is_retryable());
        assert!(!LogError::Closed.is_retryable());
    }

    #[test]
    fn error_display() {
        let msg = LogError::out_of_range(3, 7).to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('7'));

        let msg = LogError::resource_exhausted(2048, 1024).to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn io_error_kinds() {
        let io: io::Error = LogError::Interrupted.into();
        assert_eq!(io.kind(), io::ErrorKind::Interrupted);

        let io: io::Error = LogError::out_of_range(0, 0).into();
        assert_eq!(io.kind(), io::ErrorKind::InvalidInput);

        let io: io::Error = LogError::resource_exhausted(1, 0).into();
        assert_eq!(io.kind(), io::ErrorKind::OutOfMemory);

        let io: io::Error = LogError::Closed.into();
        assert_eq!(io.kind(), io::ErrorKind::NotConnected);
    }
}
