//! Error types

use thiserror::Error;

/// Crate error type
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The capture process could not be started
    #[error("Capture source unavailable: {0}")]
    SourceUnavailable(String),

    /// The capture process stopped producing bytes
    #[error("Capture source terminated")]
    SourceTerminated,

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
