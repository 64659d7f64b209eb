//! Per-run release catalog
//!
//! Memoizes each module's release list for the duration of one install run so
//! modules shared by several dependents are fetched from the repository once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::try_join_all;
use tracing::debug;

use modforge_core::error::{ForgeError, ForgeResult};
use modforge_core::types::{ModuleName, Release, Version};

use crate::repository::Repository;
use crate::RegistryResult;

/// Catalog statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Modules with a cached release list
    pub modules: usize,
    /// Metadata requests sent to the repository
    pub registry_calls: usize,
}

/// Read-only view of the repository's release metadata for one run
#[derive(Debug)]
pub struct VersionCatalog<'r, R: Repository> {
    repository: &'r R,
    /// Releases per module, sorted by ascending version
    releases: DashMap<ModuleName, Arc<Vec<Release>>>,
    registry_calls: AtomicUsize,
}

impl<'r, R: Repository> VersionCatalog<'r, R> {
    /// Create an empty catalog over a repository
    pub fn new(repository: &'r R) -> Self {
        Self {
            repository,
            releases: DashMap::new(),
            registry_calls: AtomicUsize::new(0),
        }
    }

    /// The repository this catalog reads from
    pub fn repository(&self) -> &'r R {
        self.repository
    }

    /// All known releases of a module, fetching them on first use
    ///
    /// Fails with `CatalogUnavailable` when the repository knows no release.
    pub async fn fetch(&self, module: &ModuleName) -> RegistryResult<Arc<Vec<Release>>> {
        if let Some(cached) = self.get(module) {
            return Ok(cached);
        }

        self.registry_calls.fetch_add(1, Ordering::Relaxed);
        let infos = self.repository.remote_dependency_info(module).await?;
        if infos.is_empty() {
            return Err(ForgeError::CatalogUnavailable {
                module: module.to_string(),
            });
        }

        let mut releases = infos
            .iter()
            .map(|info| info.into_release(module))
            .collect::<ForgeResult<Vec<_>>>()?;
        releases.sort_by(|a, b| a.version.cmp(&b.version));
        releases.dedup_by(|a, b| a.version == b.version);
        debug!(module = %module, releases = releases.len(), "catalog entry loaded");

        // Another task may have raced us to the same module; keep the first
        // entry so every caller observes one release list
        let entry = self
            .releases
            .entry(module.clone())
            .or_insert_with(|| Arc::new(releases));
        Ok(Arc::clone(entry.value()))
    }

    /// Fetch every module not yet cached, concurrently
    pub async fn fetch_all<I>(&self, modules: I) -> RegistryResult<()>
    where
        I: IntoIterator<Item = ModuleName>,
    {
        let pending: Vec<ModuleName> = modules
            .into_iter()
            .filter(|module| !self.contains(module))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        debug!(count = pending.len(), "fetching catalog entries");
        try_join_all(pending.iter().map(|module| self.fetch(module))).await?;
        Ok(())
    }

    /// Cached releases of a module, without touching the repository
    pub fn get(&self, module: &ModuleName) -> Option<Arc<Vec<Release>>> {
        self.releases
            .get(module)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a module's releases are cached
    pub fn contains(&self, module: &ModuleName) -> bool {
        self.releases.contains_key(module)
    }

    /// A specific cached release
    pub fn release(&self, module: &ModuleName, version: &Version) -> Option<Release> {
        let releases = self.get(module)?;
        let found = releases
            .iter()
            .find(|release| &release.version == version)
            .cloned();
        found
    }

    /// Catalog statistics
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            modules: self.releases.len(),
            registry_calls: self.registry_calls.load(Ordering::Relaxed),
        }
    }
}
