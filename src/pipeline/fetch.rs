//! Fetching resolved source audio.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, Result};

/// Downloads the raw bytes behind a resolved source URL.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AudioFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url = %url, "Fetching source audio");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::source_download_failed(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::source_download_failed(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::source_download_failed(format!("{}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_server::{serve, Reply};

    #[tokio::test]
    async fn unreachable_source_is_a_download_failure() {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let err = HttpFetcher::new(http)
            .fetch("http://127.0.0.1:9/track.mp3")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SourceDownloadFailed);
    }

    #[tokio::test]
    async fn fetch_returns_body_bytes() {
        let server = serve(|_| Reply::ok("ID3-audio")).await;
        let bytes = HttpFetcher::new(reqwest::Client::new())
            .fetch(&server.url("/track.mp3"))
            .await
            .unwrap();
        assert_eq!(bytes, b"ID3-audio");
    }

    #[tokio::test]
    async fn error_status_is_a_download_failure() {
        let server = serve(|_| Reply::status(404, "gone")).await;
        let err = HttpFetcher::new(reqwest::Client::new())
            .fetch(&server.url("/track.mp3"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SourceDownloadFailed);
        assert!(err.message.contains("404"));
    }
}
