//! Error types for the log server.

use ringlog_core::LogError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the log server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// I/O error on a socket or the data file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the ring log device.
    #[error("log error: {0}")]
    Log(#[from] LogError),

    /// A control command could not be parsed.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A blocking sink task failed to complete.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The sink cannot perform the requested operation.
    #[error("unsupported by sink: {0}")]
    Unsupported(String),
}

impl ServerError {
    /// Returns true if the error was caused by what a client sent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidCommand(_)
                | ServerError::Unsupported(_)
                | ServerError::Log(LogError::OutOfRange { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::InvalidCommand("bad".into()).is_client_error());
        assert!(ServerError::Log(LogError::out_of_range(1, 1)).is_client_error());
        assert!(!ServerError::Log(LogError::Closed).is_client_error());
        let io = std::io::Error::other("boom");
        assert!(!ServerError::from(io).is_client_error());
    }

    #[test]
    fn error_display() {
        let err = ServerError::from(LogError::out_of_range(4, 2));
        let msg = err.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('2'));
    }
}
