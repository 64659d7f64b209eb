//! Configuration for modforge
//!
//! Settings are layered from built-in defaults, the global
//! `~/.modforge/config.toml`, the nearest project `modforge.toml`,
//! `MODFORGE_*` environment variables and command-line flags, in increasing
//! priority.

pub mod merge;
pub mod settings;
pub mod toml;

// Re-export main types
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use settings::Settings;
pub use self::toml::{ConfigFile, PathsSection, RegistrySection};

use modforge_core::error::ForgeError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ForgeError>;
