//! Camera snapshot capture.
//!
//! [`ImageCapture`] fetches a burst of snapshots from a camera URL and saves
//! them to the snapshot directory. Fetches run strictly in sequence with a
//! fixed pause between them. Every fetch is best-effort: a failure is logged
//! and the burst carries on with the next index. Snapshots only live until
//! the notification carrying them has been attempted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use doorwatch_core::naming::{expand_image_url, snapshot_filename};
use doorwatch_core::types::Timestamp;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single snapshot fetch.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The underlying HTTP request failed (network, DNS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The camera returned a non-2xx status code.
    #[error("Camera returned HTTP {0}")]
    HttpStatus(u16),

    /// The snapshot could not be written to disk.
    #[error("Failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

// ---------------------------------------------------------------------------
// ImageFetcher
// ---------------------------------------------------------------------------

/// Transport capability: download one image.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CaptureError>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CaptureError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CaptureError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CaptureError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

// ---------------------------------------------------------------------------
// ImageCapture
// ---------------------------------------------------------------------------

/// Captures snapshot bursts for transition events.
pub struct ImageCapture {
    fetcher: Arc<dyn ImageFetcher>,
    snapshot_dir: PathBuf,
    fetch_timeout: Duration,
}

impl ImageCapture {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        snapshot_dir: impl Into<PathBuf>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            snapshot_dir: snapshot_dir.into(),
            fetch_timeout,
        }
    }

    /// Delete snapshots once their notification attempt is over.
    ///
    /// Files that cannot be removed are logged and left in place.
    pub async fn discard(&self, paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove snapshot");
            }
        }
    }

    /// Fetch up to `count` snapshots for an event on `door` at `at`.
    ///
    /// Waits `delay` between successive fetches. Returns the paths of the
    /// snapshots that were saved, in fetch order; empty when `template` is
    /// unset or `count` is zero.
    pub async fn capture(
        &self,
        door: &str,
        template: Option<&str>,
        count: u32,
        delay: Duration,
        at: Timestamp,
    ) -> Vec<PathBuf> {
        let Some(template) = template else {
            return Vec::new();
        };
        if count == 0 {
            return Vec::new();
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.snapshot_dir).await {
            tracing::warn!(
                dir = %self.snapshot_dir.display(),
                error = %e,
                "Could not create snapshot directory",
            );
        }

        let mut saved = Vec::with_capacity(count as usize);

        for index in 0..count {
            let url = expand_image_url(template, index);
            let path = self.snapshot_dir.join(snapshot_filename(door, at, index));

            match self.capture_one(&url, &path).await {
                Ok(size) => {
                    tracing::info!(door, index, size, path = %path.display(), "Snapshot saved");
                    saved.push(path);
                }
                Err(e) => {
                    tracing::warn!(door, index, url = %url, error = %e, "Snapshot skipped");
                }
            }

            if index + 1 < count && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        saved
    }

    /// Fetch one image and write it to `path`, returning its size in bytes.
    async fn capture_one(&self, url: &str, path: &Path) -> Result<usize, CaptureError> {
        let bytes = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| CaptureError::Timeout(self.fetch_timeout))??;
        tokio::fs::write(path, &bytes).await?;
        Ok(bytes.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_fetcher_builds() {
        assert!(HttpImageFetcher::new(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn capture_error_display_http_status() {
        let err = CaptureError::HttpStatus(503);
        assert_eq!(err.to_string(), "Camera returned HTTP 503");
    }

    #[test]
    fn capture_error_display_timeout() {
        let err = CaptureError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Snapshot fetch timed out after 1500ms");
    }

    #[tokio::test]
    async fn http_fetcher_reports_connection_failure() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:1/snapshot.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::Request(_)));
    }
}
