//! Caller-visible outcome of an install run.

use serde::{Deserialize, Serialize};

use modforge_core::types::{ModuleName, Version};
use modforge_resolver::{ErrorReport, ResolutionNode};

/// Outcome of a run that got past name validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum InstallResult {
    /// Every resolved module was installed; root first
    Success {
        installed_modules: Vec<InstalledModule>,
    },
    /// Resolution failed and nothing was installed
    Failure { error: ErrorReport },
}

/// One installed module with the modules installed beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledModule {
    pub module: ModuleName,
    pub version: InstalledVersion,
    pub dependencies: Vec<InstalledModule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledVersion {
    pub vstring: String,
}

impl InstallResult {
    pub fn success(tree: &ResolutionNode) -> Self {
        InstallResult::Success {
            installed_modules: vec![InstalledModule::from(tree)],
        }
    }

    pub fn failure(error: ErrorReport) -> Self {
        InstallResult::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InstallResult::Success { .. })
    }

    /// Installed modules, empty on failure
    pub fn installed_modules(&self) -> &[InstalledModule] {
        match self {
            InstallResult::Success { installed_modules } => installed_modules,
            InstallResult::Failure { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            InstallResult::Success { .. } => None,
            InstallResult::Failure { error } => Some(error),
        }
    }
}

impl InstalledModule {
    /// Total modules in this subtree
    pub fn count(&self) -> usize {
        1 + self.dependencies.iter().map(InstalledModule::count).sum::<usize>()
    }
}

impl From<&ResolutionNode> for InstalledModule {
    fn from(node: &ResolutionNode) -> Self {
        Self {
            module: node.module.clone(),
            version: InstalledVersion::from(&node.version),
            dependencies: node.children.iter().map(InstalledModule::from).collect(),
        }
    }
}

impl From<&Version> for InstalledVersion {
    fn from(version: &Version) -> Self {
        Self {
            vstring: version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::types::{ArchiveRef, Release};

    fn node(module: &str, version: Version, children: Vec<ResolutionNode>) -> ResolutionNode {
        let release = Release::new(
            ModuleName::parse(module).unwrap(),
            version,
            ArchiveRef::new(format!("/{}.tar.gz", module)),
        );
        let mut node = ResolutionNode::leaf(&release);
        node.children = children;
        node
    }

    #[test]
    fn test_success_json_shape() {
        let tree = node(
            "pmtacceptance-java",
            Version::new(1, 7, 1),
            vec![node("pmtacceptance-stdlib", Version::new(1, 0, 0), vec![])],
        );

        let value = serde_json::to_value(InstallResult::success(&tree)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "result": "success",
                "installed_modules": [{
                    "module": "pmtacceptance-java",
                    "version": { "vstring": "1.7.1" },
                    "dependencies": [{
                        "module": "pmtacceptance-stdlib",
                        "version": { "vstring": "1.0.0" },
                        "dependencies": []
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_failure_json_shape() {
        let result = InstallResult::failure(ErrorReport {
            oneline: "short".to_string(),
            multiline: "long\n  form".to_string(),
        });

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["result"], "failure");
        assert_eq!(value["error"]["oneline"], "short");
        assert!(result.installed_modules().is_empty());
        assert!(!result.is_success());
    }

    #[test]
    fn test_count() {
        let tree = node(
            "acme-web",
            Version::new(1, 0, 0),
            vec![
                node("acme-base", Version::new(1, 0, 0), vec![]),
                node("acme-http", Version::new(2, 1, 0), vec![]),
            ],
        );
        assert_eq!(InstalledModule::from(&tree).count(), 3);
    }
}
