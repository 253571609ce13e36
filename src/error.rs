//! Error types for the Cardwatch engine
//!
//! This module provides structured error definitions using thiserror.
//! No variant here is process-fatal: handlers catch at the boundary of
//! the event or command that produced the error so one bad event never
//! halts the processing loop.

use thiserror::Error;

/// Main error type for Cardwatch operations
#[derive(Error, Debug)]
pub enum CardwatchError {
    /// Durable-store read/write failure. Non-fatal: the engine fails
    /// open (lookup faults read as "unclassified", upsert faults keep
    /// the in-memory state).
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Lookback offset beyond the remembered history window
    #[error("History offset {offset} out of range (history holds {len})")]
    OutOfRange { offset: usize, len: usize },

    /// Action signal arrived before any card was seen
    #[error("No cards in history yet")]
    EmptyHistory,

    /// Unparseable operator input
    #[error("Unknown command: {0}")]
    MalformedCommand(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Cardwatch operations
pub type Result<T> = std::result::Result<T, CardwatchError>;

impl From<anyhow::Error> for CardwatchError {
    fn from(err: anyhow::Error) -> Self {
        CardwatchError::Other(err.to_string())
    }
}
