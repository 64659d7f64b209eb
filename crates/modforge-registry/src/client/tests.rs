//! Unit tests for registry client

use super::*;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    }
}

fn client_for(server: &MockServer, cache_dir: &Path, max_retries: u32) -> RegistryClient {
    RegistryClient::with_config(
        &server.uri(),
        cache_dir,
        fast_retry(max_retries),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn stdlib() -> ModuleName {
    ModuleName::parse("pmtacceptance-stdlib").unwrap()
}

#[tokio::test]
async fn test_registry_client_creation() {
    let cache = tempfile::tempdir().unwrap();
    let client = RegistryClient::new(cache.path()).unwrap();
    assert_eq!(client.base_url(), DEFAULT_REGISTRY);
    assert_eq!(client.retry_config.max_retries, 3);
    assert_eq!(client.cache_dir(), cache.path());
}

#[tokio::test]
async fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);
}

#[tokio::test]
async fn test_fetch_releases_success() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    let body = serde_json::json!({
        "pmtacceptance/stdlib": [
            {
                "dependencies": [],
                "version": "0.0.1",
                "file": "/pmtacceptance-stdlib-0.0.1.tar.gz"
            },
            {
                "dependencies": [],
                "version": "1.0.0",
                "file": "/pmtacceptance-stdlib-1.0.0.tar.gz"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/releases.json"))
        .and(query_param("module", "pmtacceptance/stdlib"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 0);
    let releases = client.remote_dependency_info(&stdlib()).await.unwrap();

    assert_eq!(releases.len(), 2);
    assert_eq!(releases[1].version, "1.0.0");
    assert_eq!(releases[1].file, "/pmtacceptance-stdlib-1.0.0.tar.gz");
}

#[tokio::test]
async fn test_fetch_releases_not_found_is_empty() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/releases.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 0);
    let releases = client.fetch_releases(&stdlib()).await.unwrap();
    assert!(releases.is_empty());
}

#[tokio::test]
async fn test_fetch_releases_missing_key_is_empty() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/releases.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 0);
    assert!(client.fetch_releases(&stdlib()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unparseable_metadata_is_not_retried() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/releases.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 3);
    let err = client.fetch_releases(&stdlib()).await.unwrap_err();

    match err {
        ForgeError::JsonParse { ref message } => {
            assert!(message.contains("pmtacceptance/stdlib"));
        },
        other => panic!("expected a parse error, got {:?}", other),
    }
    assert!(!err.is_recoverable());
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_server_error_is_retried_then_fails() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/releases.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 2);
    let result = client.fetch_releases(&stdlib()).await;

    match result.unwrap_err() {
        ForgeError::Network { message, .. } => assert!(message.contains("500")),
        other => panic!("Expected Network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retrieve_downloads_once_and_reuses_cache() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/pmtacceptance-stdlib-1.0.0.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive bytes".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 0);
    let archive = ArchiveRef::new("/pmtacceptance-stdlib-1.0.0.tar.gz");

    let first = client.retrieve(&archive).await.unwrap();
    assert_eq!(first, cache.path().join("pmtacceptance-stdlib-1.0.0.tar.gz"));
    assert_eq!(std::fs::read(&first).unwrap(), b"archive bytes");
    assert!(!cache
        .path()
        .join("pmtacceptance-stdlib-1.0.0.tar.gz.part")
        .exists());

    let second = client.retrieve(&archive).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_retrieve_failure_is_transport_error() {
    let mock_server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/missing.tar.gz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, cache.path(), 0);
    let err = client
        .retrieve(&ArchiveRef::new("/missing.tar.gz"))
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(!cache.path().join("missing.tar.gz").exists());
}

#[tokio::test]
async fn test_archive_url_forms() {
    let cache = tempfile::tempdir().unwrap();
    let client = RegistryClient::with_config(
        "https://forge.example.com/",
        cache.path(),
        RetryConfig::default(),
        Duration::from_secs(5),
    )
    .unwrap();

    let relative = client.archive_url(&ArchiveRef::new("/a-b-1.0.0.tar.gz")).unwrap();
    assert_eq!(relative.as_str(), "https://forge.example.com/a-b-1.0.0.tar.gz");

    let absolute = client
        .archive_url(&ArchiveRef::new("https://cdn.example.com/x/a-b-1.0.0.tar.gz"))
        .unwrap();
    assert_eq!(absolute.host_str(), Some("cdn.example.com"));
}
