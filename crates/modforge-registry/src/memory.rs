//! In-memory repository
//!
//! Serves release metadata from a forge-shaped JSON document and maps archive
//! locators onto a fixed cache root without touching the network. Used as the
//! test double for the installer and as the benchmark fixture source.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tracing::debug;

use modforge_core::error::{ForgeError, ForgeResult};
use modforge_core::types::{ArchiveRef, ModuleName};

use crate::api::{ReleaseInfo, ReleasesResponse};
use crate::repository::Repository;
use crate::RegistryResult;

const DEFAULT_CACHE_ROOT: &str = "/fake_cache";

/// Repository backed by a fixed release table
#[derive(Debug)]
pub struct MemoryRepository {
    /// Releases keyed by canonical `owner-name`
    modules: HashMap<String, Vec<ReleaseInfo>>,
    cache_root: PathBuf,
    failing: HashSet<String>,
    info_calls: AtomicUsize,
    retrievals: DashMap<ArchiveRef, usize>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            cache_root: PathBuf::from(DEFAULT_CACHE_ROOT),
            failing: HashSet::new(),
            info_calls: AtomicUsize::new(0),
            retrievals: DashMap::new(),
        }
    }

    /// Load a forge releases document (`{"owner/name": [release, ...]}`)
    pub fn from_json(content: &str) -> ForgeResult<Self> {
        let response: ReleasesResponse =
            serde_json::from_str(content).map_err(|e| ForgeError::JsonParse {
                message: e.to_string(),
            })?;

        let mut repository = Self::new();
        for (module, releases) in response {
            repository = repository.with_module(&module, releases);
        }
        Ok(repository)
    }

    /// Add (or extend) a module's release list
    pub fn with_module(mut self, module: &str, releases: Vec<ReleaseInfo>) -> Self {
        self.modules
            .entry(canonical_key(module))
            .or_default()
            .extend(releases);
        self
    }

    /// Directory that retrieved locators resolve into
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    /// Make retrieval of one archive locator fail
    pub fn fail_retrieval(mut self, file: impl Into<String>) -> Self {
        self.failing.insert(file.into());
        self
    }

    /// Number of metadata requests served
    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::Relaxed)
    }

    /// Number of archive retrievals served
    pub fn retrieve_calls(&self) -> usize {
        self.retrievals.iter().map(|entry| *entry.value()).sum()
    }

    /// Number of retrievals of one archive locator
    pub fn retrieve_count(&self, archive: &ArchiveRef) -> usize {
        self.retrievals
            .get(archive)
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    /// Local path a locator resolves to
    pub fn local_path(&self, archive: &ArchiveRef) -> PathBuf {
        self.cache_root.join(archive.as_str().trim_start_matches('/'))
    }

    fn known_archive(&self, archive: &ArchiveRef) -> bool {
        self.modules
            .values()
            .flatten()
            .any(|release| release.file == archive.as_str())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MemoryRepository {
    async fn remote_dependency_info(
        &self,
        module: &ModuleName,
    ) -> RegistryResult<Vec<ReleaseInfo>> {
        self.info_calls.fetch_add(1, Ordering::Relaxed);
        debug!(module = %module, "serving release metadata from memory");
        Ok(self
            .modules
            .get(&module.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn retrieve(&self, archive: &ArchiveRef) -> RegistryResult<PathBuf> {
        *self.retrievals.entry(archive.clone()).or_insert(0) += 1;

        if self.failing.contains(archive.as_str()) || !self.known_archive(archive) {
            return Err(ForgeError::Network {
                message: format!("Failed to download {}", archive),
                source: None,
            });
        }

        Ok(self.local_path(archive))
    }
}

/// `owner-name` for valid identifiers, the raw key otherwise
fn canonical_key(module: &str) -> String {
    ModuleName::parse(module)
        .map(|name| name.to_string())
        .unwrap_or_else(|_| module.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "acme/base": [
            { "dependencies": [], "version": "1.0.0", "file": "/acme-base-1.0.0.tar.gz" }
        ],
        "acme-web": [
            { "dependencies": [["acme/base", ">= 1.0.0"]],
              "version": "0.1.0", "file": "/acme-web-0.1.0.tar.gz" }
        ]
    }"#;

    #[tokio::test]
    async fn test_from_json_normalizes_keys() {
        let repo = MemoryRepository::from_json(FIXTURE).unwrap();

        let base = ModuleName::parse("acme-base").unwrap();
        let web = ModuleName::parse("acme/web").unwrap();
        assert_eq!(repo.remote_dependency_info(&base).await.unwrap().len(), 1);
        assert_eq!(repo.remote_dependency_info(&web).await.unwrap().len(), 1);
        assert_eq!(repo.info_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_module_is_empty() {
        let repo = MemoryRepository::from_json(FIXTURE).unwrap();
        let other = ModuleName::parse("acme-other").unwrap();
        assert!(repo.remote_dependency_info(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_maps_into_cache_root() {
        let repo = MemoryRepository::from_json(FIXTURE)
            .unwrap()
            .with_cache_root("/tmp/cache");
        let archive = ArchiveRef::new("/acme-base-1.0.0.tar.gz");

        let path = repo.retrieve(&archive).await.unwrap();
        assert_eq!(path, PathBuf::from("/tmp/cache/acme-base-1.0.0.tar.gz"));
        assert_eq!(repo.retrieve_count(&archive), 1);
        assert_eq!(repo.retrieve_calls(), 1);
    }

    #[test]
    fn test_default_cache_root() {
        let repo = MemoryRepository::from_json(FIXTURE).unwrap();
        let path = tokio_test::block_on(repo.retrieve(&ArchiveRef::new("/acme-web-0.1.0.tar.gz")))
            .unwrap();
        assert_eq!(path, PathBuf::from("/fake_cache/acme-web-0.1.0.tar.gz"));
    }

    #[tokio::test]
    async fn test_retrieve_failures() {
        let repo = MemoryRepository::from_json(FIXTURE)
            .unwrap()
            .fail_retrieval("/acme-base-1.0.0.tar.gz");

        let failing = repo.retrieve(&ArchiveRef::new("/acme-base-1.0.0.tar.gz")).await;
        assert!(matches!(failing, Err(ForgeError::Network { .. })));

        let unknown = repo.retrieve(&ArchiveRef::new("/nothing.tar.gz")).await;
        assert!(unknown.unwrap_err().is_transport());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            MemoryRepository::from_json("[1, 2"),
            Err(ForgeError::JsonParse { .. })
        ));
    }
}
