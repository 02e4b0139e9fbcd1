//! CLI command implementations.

pub mod replay;
pub mod serve;
pub mod write;

use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// I/O error on a file or the terminal.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the ring log.
    #[error(transparent)]
    Log(#[from] ringlog_core::LogError),

    /// Error from the log server.
    #[error(transparent)]
    Server(#[from] ringlog_server::ServerError),

    /// JSON output failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad command-line input.
    #[error("{0}")]
    Usage(String),
}
