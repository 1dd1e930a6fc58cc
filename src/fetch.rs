//! Byte sources for string tables.
//!
//! The JSON provider reads its local source synchronously, its remote source
//! asynchronously, and writes fetched payloads back to the local cache. All
//! three go through [`Fetcher`] so tests and embedders can substitute their
//! own transport.

use crate::error::{LocalizationError, Result};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Transport used by providers to load raw bytes.
pub trait Fetcher: Send + Sync {
    /// Blocking read of a local file.
    fn read_sync(&self, path: &Path) -> Result<Vec<u8>>;

    /// Non-blocking read of a remote source (URL or local path).
    fn read_async<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;

    /// Blocking, atomic write of a local file, creating parent directories.
    fn write_sync(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Default fetcher: `reqwest` for `http(s)://` sources, the filesystem for
/// `file://` URLs and bare paths.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose HTTP requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| LocalizationError::Http {
                url: "<client builder>".to_string(),
                source,
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn read_sync(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| io_error(path, source))
    }

    fn read_async<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            if let Some(path) = local_path(source) {
                debug!("Reading string table from {}", path.display());
                return tokio::fs::read(&path)
                    .await
                    .map_err(|e| io_error(&path, e));
            }

            debug!("Requesting string table from {}", source);
            let response = self
                .client
                .get(source)
                .send()
                .await
                .map_err(|e| LocalizationError::Http {
                    url: source.to_string(),
                    source: e,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(LocalizationError::HttpStatus {
                    url: source.to_string(),
                    status: status.as_u16(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| LocalizationError::Http {
                    url: source.to_string(),
                    source: e,
                })?;
            Ok(bytes.to_vec())
        })
    }

    fn write_sync(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        write_atomic(path, bytes)
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
///
/// Every call uses its own temp file, so concurrent writers to one path
/// never share one; the last rename wins.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "strings".to_string());
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    std::fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        io_error(path, e)
    })
}

/// Resolve a source string to a local path, if it names one.
fn local_path(source: &str) -> Option<PathBuf> {
    if let Some(stripped) = source.strip_prefix("file://") {
        return Some(PathBuf::from(stripped));
    }
    if source.contains("://") {
        return None;
    }
    Some(PathBuf::from(source))
}

fn io_error(path: &Path, source: std::io::Error) -> LocalizationError {
    LocalizationError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Source Parsing Tests ====================

    #[test]
    fn test_local_path_file_url() {
        assert_eq!(
            local_path("file:///tmp/strings.json"),
            Some(PathBuf::from("/tmp/strings.json"))
        );
    }

    #[test]
    fn test_local_path_bare_path() {
        assert_eq!(
            local_path("assets/strings.json"),
            Some(PathBuf::from("assets/strings.json"))
        );
    }

    #[test]
    fn test_local_path_http_is_remote() {
        assert_eq!(local_path("https://example.com/strings.json"), None);
        assert_eq!(local_path("http://localhost:8080/strings.json"), None);
    }

    // ==================== Filesystem Tests ====================

    #[test]
    fn test_read_sync_missing_file_is_io_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let fetcher = HttpFetcher::default();

        let result = fetcher.read_sync(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(LocalizationError::Io { .. })));
    }

    #[test]
    fn test_write_sync_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("nested").join("cache").join("strings.json");
        let fetcher = HttpFetcher::default();

        fetcher
            .write_sync(&target, br#"{"en":{"hello":"Hi"}}"#)
            .expect("write should succeed");

        let written = std::fs::read(&target).expect("file should exist");
        assert_eq!(written, br#"{"en":{"hello":"Hi"}}"#);
    }

    #[test]
    fn test_write_sync_replaces_existing_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("strings.json");
        let fetcher = HttpFetcher::default();

        fetcher.write_sync(&target, b"old").unwrap();
        fetcher.write_sync(&target, b"new").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp files should not be left behind");
    }

    #[test]
    fn test_concurrent_writes_to_same_path_all_succeed() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let target = temp_dir.path().join("strings.json");
        let payloads: Vec<String> = (0..8).map(|i| format!(r#"{{"en":{{"n":"{i}"}}}}"#)).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = payloads
                .iter()
                .map(|payload| {
                    let target = &target;
                    scope.spawn(move || write_atomic(target, payload.as_bytes()))
                })
                .collect();
            for handle in handles {
                handle
                    .join()
                    .expect("writer panicked")
                    .expect("every concurrent write should succeed");
            }
        });

        let written = String::from_utf8(std::fs::read(&target).unwrap()).unwrap();
        assert!(payloads.contains(&written));
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp files should not be left behind");
    }

    #[tokio::test]
    async fn test_read_async_local_file_url() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("strings.json");
        std::fs::write(&file, b"{}").unwrap();
        let fetcher = HttpFetcher::default();

        let url = format!("file://{}", file.display());
        let bytes = fetcher.read_async(&url).await.expect("read should succeed");
        assert_eq!(bytes, b"{}");
    }

    // ==================== HTTP Tests ====================

    #[tokio::test]
    async fn test_read_async_http_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/strings.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"en":{}}"#))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/strings.json", mock_server.uri());
        let bytes = fetcher.read_async(&url).await.expect("fetch should succeed");

        assert_eq!(bytes, br#"{"en":{}}"#);
    }

    #[tokio::test]
    async fn test_read_async_http_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/strings.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::default();
        let url = format!("{}/strings.json", mock_server.uri());
        let result = fetcher.read_async(&url).await;

        match result {
            Err(LocalizationError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected HttpStatus error, got {:?}", other),
        }
    }
}
