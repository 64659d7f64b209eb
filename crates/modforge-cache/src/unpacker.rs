//! The unpacker collaborator contract and the tarball implementation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use modforge_core::error::ForgeError;
use modforge_core::types::{InstallOptions, ModuleMetadata, ModuleName};

use crate::tarball::extract_tarball;
use crate::CacheResult;

/// Materializes one retrieved archive into the install target
///
/// Called once per resolved module, possibly from several threads at once;
/// each call writes only beneath its own module directory.
pub trait Unpacker: Send + Sync {
    /// Unpack the archive at `archive` according to `options`
    fn run(&self, archive: &Path, options: &InstallOptions) -> CacheResult<()>;
}

/// Unpacks gzipped module tarballs into `<dir>/<name>`
#[derive(Debug, Clone, Copy, Default)]
pub struct TarballUnpacker;

impl TarballUnpacker {
    pub fn new() -> Self {
        Self
    }

    /// Unpack and return the installed module directory
    pub fn unpack(&self, archive: &Path, options: &InstallOptions) -> CacheResult<PathBuf> {
        let target = options.target_dir();
        fs::create_dir_all(target)
            .map_err(|e| ForgeError::io(format!("Failed to create {}", target.display()), e))?;

        // Staged beside the target so the final move is a rename on one
        // filesystem
        let staging = tempfile::Builder::new()
            .prefix(".modforge-unpack-")
            .tempdir_in(target)
            .map_err(|e| ForgeError::io(format!("Failed to stage in {}", target.display()), e))?;

        let file = fs::File::open(archive)
            .map_err(|e| ForgeError::unpack(archive, format!("cannot open archive: {}", e)))?;
        extract_tarball(file, staging.path()).map_err(|e| match e {
            ForgeError::Unpack { reason, .. } => ForgeError::unpack(archive, reason),
            other => ForgeError::unpack(archive, other.to_string()),
        })?;

        let root = single_top_level_dir(staging.path())
            .ok_or_else(|| ForgeError::unpack(archive, "expected one top-level directory"))?;
        let module = module_name_of(&root)
            .ok_or_else(|| ForgeError::unpack(archive, "cannot determine the module name"))?;

        let dest = target.join(module.name());
        if dest.exists() {
            debug!(path = %dest.display(), "replacing installed module");
            fs::remove_dir_all(&dest)
                .map_err(|e| ForgeError::io(format!("Failed to remove {}", dest.display()), e))?;
        }
        fs::rename(&root, &dest)
            .map_err(|e| ForgeError::io(format!("Failed to move into {}", dest.display()), e))?;

        debug!(
            archive = %archive.display(),
            module = %module,
            path = %dest.display(),
            force = options.force,
            "unpacked module"
        );
        Ok(dest)
    }
}

impl Unpacker for TarballUnpacker {
    fn run(&self, archive: &Path, options: &InstallOptions) -> CacheResult<()> {
        self.unpack(archive, options).map(|_| ())
    }
}

/// The only directory directly under `dir`
fn single_top_level_dir(dir: &Path) -> Option<PathBuf> {
    let mut dirs = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir());

    let first = dirs.next()?;
    match dirs.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Module identity from `metadata.json`, else from an `owner-name-X.Y.Z`
/// directory name
fn module_name_of(root: &Path) -> Option<ModuleName> {
    if let Ok(name) = ModuleMetadata::load(root).and_then(|meta| meta.module_name()) {
        return Some(name);
    }

    let dir_name = root.file_name()?.to_str()?;
    let (stem, _version) = dir_name.rsplit_once('-')?;
    ModuleName::parse(stem).ok()
}
