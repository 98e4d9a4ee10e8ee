//! Errors for the fallible edges of the core: parameter persistence and
//! configuration files. The per-sweep algorithm itself never fails.

use std::io;
use thiserror::Error;

/// Result type for persistence and configuration operations
pub type TargetingResult<T> = Result<T, TargetingError>;

#[derive(Error, Debug)]
pub enum TargetingError {
    /// Backing storage could not be read or written
    #[error("parameter storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Stored record has the wrong size
    #[error("parameter record length mismatch: expected {expected}, got {actual}")]
    RecordLength { expected: usize, actual: usize },

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration parsed but violates an invariant
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
