//! Ledger parsing, cache construction, and the mapped store

pub mod format;
pub mod ledger;
pub mod preprocess;
pub mod store;
pub mod view;

// Re-export commonly used items
pub use store::{RecordProof, Store};
