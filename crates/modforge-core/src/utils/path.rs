//! Path utilities for writing archive contents safely.
//!
//! Archive entries are untrusted input; these helpers keep them inside the
//! directory they are extracted into.

use crate::error::{ForgeError, ForgeResult};
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if components.is_empty() {
                    // This would escape the base directory
                    components.push(component);
                } else {
                    components.pop();
                }
            },
            other => {
                components.push(other);
            },
        }
    }

    components.iter().collect()
}

/// Check if a path is safe (relative, never climbs above its base)
pub fn is_safe_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Component::Normal(_) => {
                depth += 1;
            },
            _ => {
                return false;
            },
        }
    }

    true
}

/// Safely join paths, preventing directory traversal
pub fn safe_join(base: &Path, path: &Path) -> ForgeResult<PathBuf> {
    if !is_safe_path(path) {
        return Err(ForgeError::unpack(
            base,
            format!("archive entry escapes the destination: {}", path.display()),
        ));
    }

    Ok(base.join(normalize_path(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("./manifests/../lib/./init.pp");
        assert_eq!(normalize_path(path), Path::new("lib/init.pp"));
    }

    #[test]
    fn test_is_safe_path() {
        assert!(is_safe_path(Path::new("manifests/init.pp")));
        assert!(is_safe_path(Path::new("./manifests/init.pp")));
        assert!(is_safe_path(Path::new("a/../b")));
        assert!(!is_safe_path(Path::new("../../../etc/passwd")));
        assert!(!is_safe_path(Path::new("/absolute/path")));
    }

    #[test]
    fn test_safe_join() {
        let base = Path::new("/modules");

        let joined = safe_join(base, Path::new("stdlib/metadata.json")).unwrap();
        assert_eq!(joined, Path::new("/modules/stdlib/metadata.json"));

        let result = safe_join(base, Path::new("../../../etc/passwd"));
        assert!(matches!(result, Err(ForgeError::Unpack { .. })));
    }
}
