//! The install run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use modforge_cache::Unpacker;
use modforge_core::error::{ForgeError, ForgeResult};
use modforge_core::types::{InstallOptions, ModuleName};
use modforge_registry::{Repository, VersionCatalog};
use modforge_resolver::{ErrorReporter, ResolutionNode, ResolveError, Solver};

use crate::mode::ResolutionMode;
use crate::preflight::{check_install_paths, check_local_modules};
use crate::result::InstallResult;

/// Installs a module and its dependencies through the two collaborators
#[derive(Debug)]
pub struct Installer<R, U> {
    repository: R,
    unpacker: Arc<U>,
}

impl<R, U> Installer<R, U>
where
    R: Repository,
    U: Unpacker + 'static,
{
    pub fn new(repository: R, unpacker: U) -> Self {
        Self {
            repository,
            unpacker: Arc::new(unpacker),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn unpacker(&self) -> &U {
        &self.unpacker
    }

    /// Install `raw_name` according to `options`
    ///
    /// Returns `Err` for an invalid name, modules sharing an install
    /// directory, invalid local metadata and collaborator failures.
    /// Resolution failures are a failure result, and no archive is retrieved
    /// or unpacked for them.
    pub async fn run(
        &self,
        raw_name: &str,
        options: &InstallOptions,
    ) -> ForgeResult<InstallResult> {
        let start = Instant::now();
        let root = ModuleName::parse(raw_name)?;
        let mode = ResolutionMode::from_options(options);
        let constraint = options.root_constraint();
        info!(module = %root, constraint = %constraint, mode = ?mode, "install started");

        let catalog = VersionCatalog::new(&self.repository);
        let resolved = match mode {
            ResolutionMode::Full => Solver::resolve(&catalog, &root, &constraint).await,
            ResolutionMode::RootOnly => {
                Solver::resolve_root_only(&catalog, &root, &constraint).await
            },
        };
        debug!(stats = ?catalog.stats(), "catalog after resolution");

        let attempted = ErrorReporter::describe_constraint(&constraint);
        let tree = match resolved {
            Ok(tree) => tree,
            Err(ResolveError::Unsatisfiable(conflict)) => {
                warn!(
                    module = %conflict.module,
                    demands = conflict.demands.len(),
                    "unsatisfiable demands"
                );
                return Ok(InstallResult::failure(ErrorReporter::format(
                    &root, &attempted, &conflict,
                )));
            },
            Err(ResolveError::Catalog(error)) if error.is_transport() => return Err(error),
            Err(ResolveError::Catalog(error)) => {
                warn!(error = %error, "catalog failure during resolution");
                return Ok(InstallResult::failure(ErrorReporter::format_catalog_failure(
                    &root, &attempted, &error,
                )));
            },
        };

        check_install_paths(&tree, options)?;
        check_local_modules(&tree, options)?;
        let archives = self.retrieve_all(&tree).await?;
        self.unpack_all(archives, options).await?;

        info!(
            module = %root,
            version = %tree.version,
            modules = tree.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "install finished"
        );
        Ok(InstallResult::success(&tree))
    }

    /// Retrieve every node's archive concurrently
    async fn retrieve_all(&self, tree: &ResolutionNode) -> ForgeResult<Vec<PathBuf>> {
        try_join_all(tree.iter().map(|node| async move {
            let path = self.repository.retrieve(&node.archive_ref).await?;
            debug!(
                module = %node.module,
                version = %node.version,
                path = %path.display(),
                "retrieved archive"
            );
            Ok::<_, ForgeError>(path)
        }))
        .await
    }

    /// Unpack retrieved archives on the blocking pool
    async fn unpack_all(
        &self,
        archives: Vec<PathBuf>,
        options: &InstallOptions,
    ) -> ForgeResult<()> {
        let unpacker = Arc::clone(&self.unpacker);
        let options = options.clone();

        tokio::task::spawn_blocking(move || {
            archives.par_iter().try_for_each(|archive| {
                debug!(archive = %archive.display(), "unpacking");
                unpacker.run(archive, &options)
            })
        })
        .await
        .map_err(|e| {
            ForgeError::io("Unpack task failed".to_string(), std::io::Error::other(e))
        })?
    }
}

/// Install `raw_name` with a one-off installer
pub async fn install<R, U>(
    repository: R,
    unpacker: U,
    raw_name: &str,
    options: &InstallOptions,
) -> ForgeResult<InstallResult>
where
    R: Repository,
    U: Unpacker + 'static,
{
    Installer::new(repository, unpacker)
        .run(raw_name, options)
        .await
}
