//! Forge releases API response types

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use modforge_core::error::{ForgeError, ForgeResult};
use modforge_core::types::{ArchiveRef, Dependency, ModuleName, Release, Version, VersionReq};

/// Response of `GET /api/v1/releases.json?module=owner/name`
///
/// Keyed by `owner/name`; the forge may include entries for dependencies of
/// the requested module as well.
pub type ReleasesResponse = HashMap<String, Vec<ReleaseInfo>>;

/// Metadata for a specific release as served by the registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseInfo {
    /// Version string
    pub version: String,
    /// Archive locator, relative to the registry root
    pub file: String,
    /// Declared dependencies
    #[serde(default)]
    pub dependencies: Vec<RemoteDependency>,
}

/// Dependency entry: `[name, constraint]` or just `[name]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RemoteDependency {
    Constrained(String, String),
    Bare([String; 1]),
}

impl RemoteDependency {
    /// Dependency name as written by the registry
    pub fn name(&self) -> &str {
        match self {
            RemoteDependency::Constrained(name, _) => name,
            RemoteDependency::Bare([name]) => name,
        }
    }

    /// Constraint text, empty when unconstrained
    pub fn constraint(&self) -> &str {
        match self {
            RemoteDependency::Constrained(_, constraint) => constraint,
            RemoteDependency::Bare(_) => "",
        }
    }
}

impl ReleaseInfo {
    /// Create release info without dependencies
    pub fn new(version: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            file: file.into(),
            dependencies: Vec::new(),
        }
    }

    /// Add a constrained dependency
    pub fn with_dependency(
        mut self,
        name: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        self.dependencies
            .push(RemoteDependency::Constrained(name.into(), constraint.into()));
        self
    }

    /// Validate into a `Release` of `module`
    pub fn into_release(&self, module: &ModuleName) -> ForgeResult<Release> {
        let malformed = |reason: String| ForgeError::MalformedRelease {
            module: module.to_string(),
            version: self.version.clone(),
            reason,
        };

        let version = Version::from_str(&self.version).map_err(|e| malformed(e.to_string()))?;

        let mut release = Release::new(module.clone(), version, ArchiveRef::new(self.file.clone()));
        for dep in &self.dependencies {
            let name = ModuleName::parse(dep.name())
                .map_err(|_| malformed(format!("invalid dependency name '{}'", dep.name())))?;
            let version_req = VersionReq::parse(dep.constraint()).map_err(|e| {
                malformed(format!("dependency '{}' has {}", dep.name(), e))
            })?;
            release = release.with_dependency(Dependency::new(name, version_req));
        }

        Ok(release)
    }
}
