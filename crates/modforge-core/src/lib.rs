//! # modforge-core
//!
//! Core types and utilities shared across all modforge crates.
//!
//! This crate provides:
//! - `ModuleName` parsing and validation for `owner-name` identifiers
//! - Version and VersionReq types for release selection
//! - Release, ModuleMetadata and InstallOptions data types
//! - ForgeError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (ModuleName, Version, Release, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Path helpers used when writing archives to disk

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ForgeError, ForgeResult};
pub use types::{
    ArchiveRef, InstallOptions, ModuleMetadata, ModuleName, Release, Version, VersionReq,
};

/// Public forge queried when no registry is configured
pub const DEFAULT_REGISTRY: &str = "https://forgeapi.puppet.com";
