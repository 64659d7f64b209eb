//! Module metadata types.
//!
//! Defines the structure of the `metadata.json` file shipped at the root of
//! every module archive and kept in every installed module directory.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use super::{ModuleName, Version};
use crate::error::{ForgeError, ForgeResult};

/// File name of module metadata inside a module directory
pub const METADATA_FILE: &str = "metadata.json";

/// Contents of `metadata.json`
///
/// Identity fields are kept as raw strings so that a broken install can be
/// described precisely instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<MetadataDependency>,
}

/// Dependency entry in `metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_requirement: Option<String>,
}

impl ModuleMetadata {
    /// Create metadata with required fields
    pub fn new(name: &ModuleName, version: &Version) -> Self {
        Self {
            name: name.to_string(),
            version: Some(version.to_string()),
            summary: None,
            author: None,
            license: None,
            source: None,
            dependencies: Vec::new(),
        }
    }

    /// Parse metadata from JSON text
    pub fn from_json(content: &str) -> ForgeResult<Self> {
        serde_json::from_str(content).map_err(|e| ForgeError::JsonParse {
            message: format!("{}: {}", METADATA_FILE, e),
        })
    }

    /// Load `metadata.json` from a module directory
    pub fn load(module_dir: &Path) -> ForgeResult<Self> {
        let path = module_dir.join(METADATA_FILE);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ForgeError::io(format!("Failed to read {}", path.display()), e))?;
        Self::from_json(&content)
    }

    /// Declared module identity
    pub fn module_name(&self) -> ForgeResult<ModuleName> {
        ModuleName::parse(&self.name)
    }

    /// Declared version, which must be a full semantic version
    pub fn parsed_version(&self) -> ForgeResult<Version> {
        let raw = self.version.as_deref().ok_or_else(|| ForgeError::InvalidVersion {
            input: String::new(),
            reason: "no version recorded".to_string(),
        })?;
        Version::from_str(raw).map_err(|e| ForgeError::InvalidVersion {
            input: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> ForgeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ForgeError::JsonParse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_creation() {
        let name = ModuleName::parse("pmtacceptance-stdlib").unwrap();
        let meta = ModuleMetadata::new(&name, &Version::new(1, 0, 0));

        assert_eq!(meta.name, "pmtacceptance-stdlib");
        assert_eq!(meta.module_name().unwrap(), name);
        assert_eq!(meta.parsed_version().unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_metadata_from_json() {
        let meta = ModuleMetadata::from_json(
            r#"{
                "name": "pmtacceptance/java",
                "version": "1.7.1",
                "author": "pmtacceptance",
                "dependencies": [
                    { "name": "pmtacceptance/stdlib", "version_requirement": "1.0.0" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(meta.module_name().unwrap().to_string(), "pmtacceptance-java");
        assert_eq!(meta.dependencies.len(), 1);
        assert_eq!(
            meta.dependencies[0].version_requirement.as_deref(),
            Some("1.0.0")
        );
    }

    #[test]
    fn test_metadata_invalid_version() {
        let meta =
            ModuleMetadata::from_json(r#"{ "name": "acme-base", "version": "one" }"#).unwrap();
        assert!(matches!(
            meta.parsed_version(),
            Err(ForgeError::InvalidVersion { .. })
        ));

        let meta = ModuleMetadata::from_json(r#"{ "name": "acme-base" }"#).unwrap();
        assert!(meta.parsed_version().is_err());
    }

    #[test]
    fn test_metadata_unparseable() {
        assert!(matches!(
            ModuleMetadata::from_json("ha ha cant parse"),
            Err(ForgeError::JsonParse { .. })
        ));
    }

    #[test]
    fn test_metadata_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let name = ModuleName::parse("acme-base").unwrap();
        let meta = ModuleMetadata::new(&name, &Version::new(0, 3, 0));
        std::fs::write(dir.path().join(METADATA_FILE), meta.to_json().unwrap()).unwrap();

        let loaded = ModuleMetadata::load(dir.path()).unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_metadata_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModuleMetadata::load(dir.path()),
            Err(ForgeError::Io { .. })
        ));
    }
}
