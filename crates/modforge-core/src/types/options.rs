//! Install options shared by the orchestrator and the unpacker.

use std::path::{Path, PathBuf};

use super::VersionReq;

/// Options for one install run
///
/// The same value is handed unchanged to every unpack so the unpacker honors
/// the target directory and the override flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Directory modules are installed into
    pub dir: PathBuf,
    /// Requested constraint on the root module
    pub version: Option<VersionReq>,
    /// Bypass resolution and overwrite the root module
    pub force: bool,
    /// Install the root module only
    pub ignore_dependencies: bool,
}

impl InstallOptions {
    /// Options installing into `dir` with no constraint and no overrides
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            version: None,
            force: false,
            ignore_dependencies: false,
        }
    }

    /// Request a constraint on the root module
    pub fn with_version(mut self, version: VersionReq) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the force flag
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the ignore-dependencies flag
    pub fn ignore_dependencies(mut self, ignore: bool) -> Self {
        self.ignore_dependencies = ignore;
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.dir
    }

    /// Constraint on the root module, unconstrained when none was requested
    pub fn root_constraint(&self) -> VersionReq {
        self.version.clone().unwrap_or_default()
    }
}
