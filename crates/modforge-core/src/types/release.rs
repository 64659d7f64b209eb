//! Release and dependency types.
//!
//! A `Release` is one published version of a module together with the
//! constraints it places on other modules and the locator of its archive.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ModuleName, Version, VersionReq};

/// Opaque locator of a release archive in the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveRef(String);

impl ArchiveRef {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dependency declared by a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: ModuleName,
    pub version_req: VersionReq,
}

impl Dependency {
    /// Create a new dependency
    pub fn new(name: ModuleName, version_req: VersionReq) -> Self {
        Self { name, version_req }
    }

    /// Create a dependency that accepts any version
    pub fn unconstrained(name: ModuleName) -> Self {
        Self::new(name, VersionReq::any())
    }
}

/// One published version of a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub module: ModuleName,
    pub version: Version,
    pub dependencies: Vec<Dependency>,
    pub archive_ref: ArchiveRef,
}

impl Release {
    /// Create a release without dependencies
    pub fn new(module: ModuleName, version: Version, archive_ref: ArchiveRef) -> Self {
        Self {
            module,
            version,
            dependencies: Vec::new(),
            archive_ref,
        }
    }

    /// Add a dependency to this release
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Whether the release declares any dependency
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.module, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_creation() {
        let module = ModuleName::parse("pmtacceptance-java").unwrap();
        let stdlib = ModuleName::parse("pmtacceptance-stdlib").unwrap();
        let release = Release::new(
            module.clone(),
            Version::new(1, 7, 1),
            ArchiveRef::new("/pmtacceptance-java-1.7.1.tar.gz"),
        )
        .with_dependency(Dependency::new(
            stdlib.clone(),
            VersionReq::parse("1.0.0").unwrap(),
        ));

        assert_eq!(release.module, module);
        assert!(release.has_dependencies());
        assert_eq!(release.dependencies[0].name, stdlib);
        assert_eq!(release.to_string(), "pmtacceptance-java@1.7.1");
        assert_eq!(
            release.archive_ref.as_str(),
            "/pmtacceptance-java-1.7.1.tar.gz"
        );
    }

    #[test]
    fn test_unconstrained_dependency() {
        let dep = Dependency::unconstrained(ModuleName::parse("acme-base").unwrap());
        assert!(dep.version_req.is_any());
    }
}
