//! Error types for the audit store

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for audit store operations
#[derive(Error, Debug)]
pub enum PorError {
    /// Input rejected before any processing
    #[error("invalid input file {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// Ledger text that cannot be parsed
    #[error("malformed ledger at line {line}: {reason}")]
    Ledger { line: usize, reason: String },

    /// Cache file bytes that do not form a valid index or commitment
    #[error("invalid cache file format: {reason}")]
    Format { reason: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PorError {
    /// Create a new invalid input error
    pub fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new malformed ledger error
    pub fn ledger(line: usize, reason: impl Into<String>) -> Self {
        Self::Ledger {
            line,
            reason: reason.into(),
        }
    }

    /// Create a new cache format error
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }
}

/// Result type alias for audit store operations
pub type Result<T> = std::result::Result<T, PorError>;
