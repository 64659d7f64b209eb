//! Utility functions and helpers.
//!
//! Common functionality used across multiple modforge crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{is_safe_path, normalize_path, safe_join};
