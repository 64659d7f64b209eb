//! Core data types for modforge.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Module identifiers
//! - Version types for semantic versioning
//! - Releases, their dependencies and archive locators
//! - Module metadata and install options

pub mod metadata;
pub mod module_name;
pub mod options;
pub mod release;
pub mod version;

// Re-export all public types
pub use metadata::{MetadataDependency, ModuleMetadata, METADATA_FILE};
pub use module_name::ModuleName;
pub use options::InstallOptions;
pub use release::{ArchiveRef, Dependency, Release};
pub use version::{Comparator, Op, PartialVersion, Version, VersionError, VersionReq};
