//! Forge registry access for modforge
//!
//! This crate defines the `Repository` collaborator contract, an HTTP client
//! for forge-style registries with retry logic, an in-memory repository used
//! as a test double and fixture source, and the per-run `VersionCatalog`
//! that memoizes release metadata while the solver explores dependencies.

pub mod api;
pub mod catalog;
pub mod client;
pub mod memory;
pub mod repository;

// Re-export main types
pub use api::{ReleaseInfo, ReleasesResponse, RemoteDependency};
pub use catalog::{CatalogStats, VersionCatalog};
pub use client::{RegistryClient, RetryConfig};
pub use memory::MemoryRepository;
pub use repository::Repository;

use modforge_core::error::ForgeError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ForgeError>;
