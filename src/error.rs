//! Error types for SentinelDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SentinelError
pub type Result<T> = std::result::Result<T, SentinelError>;

/// Unified error type for SentinelDB operations
#[derive(Debug, Error)]
pub enum SentinelError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Durable Log Errors
    // -------------------------------------------------------------------------
    /// A record could not be made durable; the mutation was not applied
    #[error("log write failed: {0}")]
    LogWrite(String),

    #[error("compaction failed: {0}")]
    Compaction(String),

    #[error("snapshot failed: {0}")]
    Snapshot(String),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SentinelError {
    /// Whether this error means state could not be persisted
    ///
    /// These are reported to clients as `-IOERR`, distinct from the `-ERR`
    /// class used for malformed requests.
    pub fn is_durability(&self) -> bool {
        matches!(
            self,
            SentinelError::Io(_)
                | SentinelError::LogWrite(_)
                | SentinelError::Compaction(_)
                | SentinelError::Snapshot(_)
        )
    }
}
