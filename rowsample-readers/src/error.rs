//! Error types for row sources and stream drivers

use thiserror::Error;

/// Error type for row sources and stream drivers
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] rowsample_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV format error
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be read as its declared kind
    #[error("Format error: {0}")]
    Format(String),

    /// The upstream source terminated abnormally
    #[error("Source error: {0}")]
    Source(String),

    /// A background task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The session task went away before the row could be delivered
    #[error("Session task closed")]
    Closed,
}

/// Result type for row sources and stream drivers
pub type Result<T> = std::result::Result<T, Error>;
