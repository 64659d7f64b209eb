//! Tarball extraction functionality
//!
//! Safe extraction of gzipped tarballs with path validation to prevent
//! directory traversal.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use modforge_core::error::ForgeError;
use modforge_core::utils::path::safe_join;

use crate::CacheResult;

/// Extract a gzipped tarball into a destination directory
pub fn extract_tarball<R: Read>(reader: R, dest_dir: &Path) -> CacheResult<()> {
    let mut archive = Archive::new(GzDecoder::new(reader));

    fs::create_dir_all(dest_dir)
        .map_err(|e| ForgeError::io(format!("Failed to create {}", dest_dir.display()), e))?;

    let entries = archive
        .entries()
        .map_err(|e| ForgeError::unpack(dest_dir, format!("unreadable archive: {}", e)))?;

    for entry_result in entries {
        let mut entry = entry_result
            .map_err(|e| ForgeError::unpack(dest_dir, format!("corrupt entry: {}", e)))?;

        let entry_path = entry
            .path()
            .map_err(|e| ForgeError::unpack(dest_dir, format!("invalid entry path: {}", e)))?
            .into_owned();
        let safe_path = safe_join(dest_dir, &entry_path)?;
        let mode = entry.header().mode().ok();

        match entry.header().entry_type() {
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                extract_regular_file(&mut entry, &safe_path)?;
            },
            tar::EntryType::Directory => {
                fs::create_dir_all(&safe_path).map_err(|e| {
                    ForgeError::io(format!("Failed to create {}", safe_path.display()), e)
                })?;
            },
            tar::EntryType::Symlink => {
                extract_symlink(&mut entry, &safe_path, dest_dir)?;
                continue;
            },
            other => {
                debug!(path = %entry_path.display(), kind = ?other, "skipping archive entry");
                continue;
            },
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = mode {
                // Keep the owner able to replace the file later
                let _ = fs::set_permissions(&safe_path, fs::Permissions::from_mode(mode | 0o600));
            }
        }
        #[cfg(not(unix))]
        let _ = mode;
    }

    Ok(())
}

/// Extract a regular file from tar entry
fn extract_regular_file<R: Read>(entry: &mut tar::Entry<R>, dest_path: &Path) -> CacheResult<()> {
    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ForgeError::io(format!("Failed to create {}", parent.display()), e))?;
    }

    let mut file = fs::File::create(dest_path)
        .map_err(|e| ForgeError::io(format!("Failed to create {}", dest_path.display()), e))?;
    std::io::copy(entry, &mut file)
        .map_err(|e| ForgeError::io(format!("Failed to write {}", dest_path.display()), e))?;

    Ok(())
}

/// Extract a symlink whose target stays inside the destination
fn extract_symlink<R: Read>(
    entry: &mut tar::Entry<R>,
    dest_path: &Path,
    dest_dir: &Path,
) -> CacheResult<()> {
    let target = entry
        .link_name()
        .map_err(|e| ForgeError::unpack(dest_dir, format!("invalid link target: {}", e)))?
        .ok_or_else(|| ForgeError::unpack(dest_dir, "symlink without target"))?
        .into_owned();

    if target.is_absolute() {
        return Err(ForgeError::unpack(
            dest_dir,
            format!("absolute symlink target: {}", target.display()),
        ));
    }

    let parent = dest_path.parent().unwrap_or(dest_dir);
    let relative_parent = parent.strip_prefix(dest_dir).unwrap_or(Path::new(""));
    safe_join(dest_dir, &relative_parent.join(&target))?;

    fs::create_dir_all(parent)
        .map_err(|e| ForgeError::io(format!("Failed to create {}", parent.display()), e))?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, dest_path)
            .map_err(|e| ForgeError::io(format!("Failed to link {}", dest_path.display()), e))?;
    }
    #[cfg(not(unix))]
    debug!(path = %dest_path.display(), "symlinks are not extracted on this platform");

    Ok(())
}
