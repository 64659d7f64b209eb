//! Archive unpacking for modforge
//!
//! This crate defines the `Unpacker` collaborator contract used by the
//! installer and implements it for gzipped module tarballs. Extraction stages
//! into a temporary directory beside the install target and validates every
//! entry path before writing it.

pub mod tarball;
pub mod unpacker;

// Re-export main types
pub use tarball::extract_tarball;
pub use unpacker::{TarballUnpacker, Unpacker};

use modforge_core::error::ForgeError;

/// Result type for unpack operations
pub type CacheResult<T> = Result<T, ForgeError>;
