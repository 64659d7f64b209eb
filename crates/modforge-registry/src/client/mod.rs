//! HTTP client implementation with connection pooling and retry logic

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::{debug, warn};
use url::Url;

use modforge_core::error::ForgeError;
use modforge_core::types::{ArchiveRef, ModuleName};

use crate::api::{ReleaseInfo, ReleasesResponse};
use crate::repository::Repository;
use crate::RegistryResult;

pub use modforge_core::DEFAULT_REGISTRY;

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// HTTP repository for forge-style registries
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL
    base_url: String,
    /// Directory downloaded archives are cached in
    cache_dir: PathBuf,
}

impl RegistryClient {
    /// Create a client for the default registry
    pub fn new(cache_dir: impl Into<PathBuf>) -> RegistryResult<Self> {
        Self::with_config(
            DEFAULT_REGISTRY,
            cache_dir,
            RetryConfig::default(),
            Duration::from_secs(30),
        )
    }

    /// Create a client with custom registry, retry policy and request timeout
    pub fn with_config(
        base_url: &str,
        cache_dir: impl Into<PathBuf>,
        retry_config: RetryConfig,
        timeout: Duration,
    ) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("modforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForgeError::network(format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            retry_config,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.retry_config.max_retries || !error.is_recoverable() {
                        return Err(error);
                    }
                    attempt += 1;
                    warn!(attempt, error = %error, "registry request failed, retrying");

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
            }
        }
    }

    /// Fetch release metadata for one module with retry logic
    pub async fn fetch_releases(&self, module: &ModuleName) -> RegistryResult<Vec<ReleaseInfo>> {
        let url = format!("{}/api/v1/releases.json", self.base_url);
        let forge_name = module.forge_name();
        debug!(module = %module, "fetching release metadata");

        self.with_retry(|| async {
            let response = self
                .client
                .get(&url)
                .query(&[("module", forge_name.as_str())])
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| ForgeError::network(format!("Failed to fetch metadata: {}", e), e))?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await.map_err(|e| {
                        ForgeError::network(format!("Failed to read metadata: {}", e), e)
                    })?;
                    // A body that arrived but does not parse is not retried
                    let mut releases: ReleasesResponse =
                        serde_json::from_str(&body).map_err(|e| ForgeError::JsonParse {
                            message: format!("release metadata for {}: {}", forge_name, e),
                        })?;
                    Ok(releases.remove(&forge_name).unwrap_or_default())
                },
                StatusCode::NOT_FOUND | StatusCode::GONE => Ok(Vec::new()),
                status => Err(ForgeError::Network {
                    message: format!("Registry returned status {}: {}", status, forge_name),
                    source: None,
                }),
            }
        })
        .await
    }

    /// Download an archive into the cache directory, reusing a cached copy
    pub async fn download_archive(&self, archive: &ArchiveRef) -> RegistryResult<PathBuf> {
        let url = self.archive_url(archive)?;
        let file_name = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ForgeError::Network {
                message: format!("Archive locator has no file name: {}", archive),
                source: None,
            })?
            .to_string();
        let dest = self.cache_dir.join(&file_name);

        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            debug!(archive = %archive, path = %dest.display(), "archive already cached");
            return Ok(dest);
        }

        debug!(archive = %archive, url = %url, "downloading archive");
        let bytes = self
            .with_retry(|| async {
                let response = self.client.get(url.clone()).send().await.map_err(|e| {
                    ForgeError::network(format!("Failed to download {}: {}", archive, e), e)
                })?;

                if !response.status().is_success() {
                    return Err(ForgeError::Network {
                        message: format!(
                            "Failed to download {}: {}",
                            archive,
                            response.status()
                        ),
                        source: None,
                    });
                }

                response.bytes().await.map_err(|e| {
                    ForgeError::network(format!("Failed to read {}: {}", archive, e), e)
                })
            })
            .await?;

        tokio::fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            ForgeError::io(
                format!("Failed to create cache directory {}", self.cache_dir.display()),
                e,
            )
        })?;

        // Write beside the destination and rename so a partial download never
        // looks cached
        let partial = self.cache_dir.join(format!("{}.part", file_name));
        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|e| ForgeError::io(format!("Failed to write {}", partial.display()), e))?;
        tokio::fs::rename(&partial, &dest)
            .await
            .map_err(|e| ForgeError::io(format!("Failed to move {}", dest.display()), e))?;

        Ok(dest)
    }

    /// Absolute URL of an archive locator
    fn archive_url(&self, archive: &ArchiveRef) -> RegistryResult<Url> {
        let raw = archive.as_str();
        let joined = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("{}/{}", self.base_url, raw.trim_start_matches('/'))
        };

        Url::parse(&joined).map_err(|e| {
            ForgeError::network(format!("Invalid archive URL '{}': {}", joined, e), e)
        })
    }
}

impl Repository for RegistryClient {
    async fn remote_dependency_info(
        &self,
        module: &ModuleName,
    ) -> RegistryResult<Vec<ReleaseInfo>> {
        self.fetch_releases(module).await
    }

    async fn retrieve(&self, archive: &ArchiveRef) -> RegistryResult<PathBuf> {
        self.download_archive(archive).await
    }
}

#[cfg(test)]
mod tests;
