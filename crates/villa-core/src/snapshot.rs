//! Published snapshot sources
//!
//! The published snapshot is the exported `villa-content.json` the site
//! serves. It is read-only from here and only consulted when the live slot is
//! empty. A missing snapshot is normal (fresh site) and reported as `None`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Errors reading the published snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Somewhere the published snapshot can be read from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Read the raw snapshot text, or `None` if there is none
    async fn fetch(&self) -> Result<Option<String>, SnapshotError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Append a cache-busting timestamp parameter to a URL
///
/// Uses `?t=` or `&t=` depending on whether the URL already has a query.
pub fn cache_busted_url(base: &str, millis: i64) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", base, sep, millis)
}

/// Snapshot served over HTTP
pub struct HttpSnapshot {
    url: String,
    client: reqwest::Client,
}

impl HttpSnapshot {
    pub fn new(url: impl Into<String>) -> Result<Self, SnapshotError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT))
            .user_agent(concat!("villa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SnapshotError::Http {
                url: url.clone(),
                source,
            })?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshot {
    async fn fetch(&self) -> Result<Option<String>, SnapshotError> {
        // Intermediate caches must never hand back a stale copy
        let url = cache_busted_url(&self.url, chrono::Utc::now().timestamp_millis());
        let http_err = |source: reqwest::Error| SnapshotError::Http {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(http_err)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SnapshotError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(http_err)?;
        Ok(Some(body))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Snapshot on the local filesystem (e.g. the site's `public/` directory)
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshot {
    async fn fetch(&self) -> Result<Option<String>, SnapshotError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_busted_url() {
        assert_eq!(
            cache_busted_url("https://villa.example/villa-content.json", 42),
            "https://villa.example/villa-content.json?t=42"
        );
        assert_eq!(
            cache_busted_url("https://villa.example/content?v=2", 42),
            "https://villa.example/content?v=2&t=42"
        );
    }

    #[tokio::test]
    async fn test_file_snapshot_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSnapshot::new(temp_dir.path().join("villa-content.json"));
        assert!(source.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_snapshot_reads_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("villa-content.json");
        std::fs::write(&path, "{}").unwrap();

        let source = FileSnapshot::new(&path);
        assert_eq!(source.fetch().await.unwrap().as_deref(), Some("{}"));
        assert!(source.describe().ends_with("villa-content.json"));
    }
}
