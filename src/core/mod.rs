//! Core types and utilities for the audit store
//!
//! This module contains the fundamental data types and error handling
//! used throughout the system.

pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{PorError, Result};
pub use types::Digest;
