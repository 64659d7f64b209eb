//! Error types and result aliases for modforge operations.
//!
//! Provides a unified error type that covers the hard failures of an install
//! run with actionable error messages. Unsatisfiable constraints are not part
//! of this enum: they are reported through the installer's failure result.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all modforge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    // Input errors
    #[error("Could not install module with invalid name: {raw}")]
    InvalidName { raw: String },

    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid version constraint '{input}': {reason}")]
    InvalidConstraint { input: String, reason: String },

    // Registry errors
    #[error("No release data available for module '{module}'")]
    CatalogUnavailable { module: String },

    #[error("Release {version} of '{module}' has malformed metadata: {reason}")]
    MalformedRelease {
        module: String,
        version: String,
        reason: String,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Local install errors
    #[error("Installed module at {} has invalid metadata: {reason}", path.display())]
    LocalMetadataInvalid { path: PathBuf, reason: String },

    #[error("'{first}' and '{second}' would both install into {}", path.display())]
    InstallPathConflict {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("Could not unpack {}: {reason}", archive.display())]
    Unpack { archive: PathBuf, reason: String },

    // Config errors
    #[error("Failed to parse modforge.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse JSON: {message}")]
    JsonParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for modforge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

impl ForgeError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create an unpack error for an archive
    pub fn unpack(archive: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Unpack {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ForgeError::Network { .. } | ForgeError::Io { .. })
    }

    /// Check if this error came from a collaborator crossing an I/O boundary
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ForgeError::Network { .. } | ForgeError::Unpack { .. } | ForgeError::Io { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ForgeError::InvalidName { .. } => {
                Some("Module names look like 'owner-name' or 'owner/name'")
            },
            ForgeError::CatalogUnavailable { .. } => {
                Some("Check the module name spelling or the configured registry")
            },
            ForgeError::Network { .. } => Some("Check your internet connection and try again"),
            ForgeError::LocalMetadataInvalid { .. } => {
                Some("Fix or remove the installed module, or re-run with --force")
            },
            ForgeError::InstallPathConflict { .. } => {
                Some("Modules sharing a name need separate install directories")
            },
            ForgeError::Unpack { .. } => {
                Some("Check that the target directory is writable and the archive is intact")
            },
            _ => None,
        }
    }
}
