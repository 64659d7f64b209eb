//! The repository collaborator contract.

use std::future::Future;
use std::path::PathBuf;

use modforge_core::types::{ArchiveRef, ModuleName};

use crate::api::ReleaseInfo;
use crate::RegistryResult;

/// Source of release metadata and release archives
///
/// Implementations perform their own transport, caching and retries. The
/// installer never retries a failed call.
pub trait Repository: Send + Sync {
    /// Every known release of one module, with each release's dependencies
    ///
    /// An unknown module yields an empty list rather than an error.
    fn remote_dependency_info(
        &self,
        module: &ModuleName,
    ) -> impl Future<Output = RegistryResult<Vec<ReleaseInfo>>> + Send;

    /// Fetch one archive into a local cache and return its local path
    fn retrieve(
        &self,
        archive: &ArchiveRef,
    ) -> impl Future<Output = RegistryResult<PathBuf>> + Send;
}
