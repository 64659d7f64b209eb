//! Checks on modules already present in the install target.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use modforge_core::error::{ForgeError, ForgeResult};
use modforge_core::types::{InstallOptions, ModuleMetadata, ModuleName};
use modforge_resolver::ResolutionNode;

/// Verify every existing install directory the run is about to replace
///
/// A directory that already holds the module must carry a readable
/// `metadata.json` with a semantic version and the same identity. With
/// `force` set, mismatches are logged and the directory is overwritten.
pub fn check_local_modules(tree: &ResolutionNode, options: &InstallOptions) -> ForgeResult<()> {
    for node in tree.iter() {
        let path = options.target_dir().join(node.module.name());
        if !path.exists() {
            continue;
        }

        match inspect(&path, &node.module) {
            Ok(()) => {
                debug!(module = %node.module, path = %path.display(), "replacing installed module");
            },
            Err(reason) if options.force => {
                warn!(
                    module = %node.module,
                    path = %path.display(),
                    reason = %reason,
                    "overwriting module with invalid local metadata"
                );
            },
            Err(reason) => return Err(ForgeError::LocalMetadataInvalid { path, reason }),
        }
    }
    Ok(())
}

/// Reject trees in which two modules share a short name
///
/// Every module unpacks into `<dir>/<name>`, so `acme-stdlib` and
/// `other-stdlib` would write the same directory.
pub fn check_install_paths(tree: &ResolutionNode, options: &InstallOptions) -> ForgeResult<()> {
    let mut claimed: HashMap<&str, &ModuleName> = HashMap::new();
    for node in tree.iter() {
        if let Some(first) = claimed.insert(node.module.name(), &node.module) {
            return Err(ForgeError::InstallPathConflict {
                path: options.target_dir().join(node.module.name()),
                first: first.to_string(),
                second: node.module.to_string(),
            });
        }
    }
    Ok(())
}

fn inspect(path: &Path, expected: &ModuleName) -> Result<(), String> {
    let metadata = ModuleMetadata::load(path).map_err(|e| match e {
        ForgeError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            "no metadata.json".to_string()
        },
        other => other.to_string(),
    })?;

    metadata.parsed_version().map_err(|e| e.to_string())?;

    let declared = metadata.module_name().map_err(|e| e.to_string())?;
    if &declared != expected {
        return Err(format!(
            "declares '{}' but '{}' is being installed",
            declared, expected
        ));
    }
    Ok(())
}
