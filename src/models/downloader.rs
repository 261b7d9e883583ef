//! Model downloader for separation models.
//!
//! Downloads a model file into the cache directory if not present locally.

use std::path::{Path, PathBuf};

use reqwest::Url;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{AppError, Result};

/// File name used when a model URL has no usable last path segment.
const FALLBACK_MODEL_FILE: &str = "model.onnx";

/// Returns the cache file name for a model URL (its last path segment).
pub fn model_file_name(model_url: &str) -> String {
    Url::parse(model_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_MODEL_FILE.to_string())
}

/// Downloads the model if it is not already cached.
///
/// Returns the local path of the model file.
pub async fn ensure_model(
    http: &reqwest::Client,
    model_url: &str,
    model_dir: &Path,
) -> Result<PathBuf> {
    let dest = model_dir.join(model_file_name(model_url));
    if dest.exists() {
        return Ok(dest);
    }

    fs::create_dir_all(model_dir).await.map_err(|e| {
        AppError::model_download_failed(format!(
            "Failed to create model directory {}: {}",
            model_dir.display(),
            e
        ))
    })?;

    info!(url = %model_url, "Downloading model (this may take several minutes on first run)");
    download_file_streaming(http, model_url, &dest).await?;
    Ok(dest)
}

/// Downloads a file in chunks, writing to `<dest>.part` and renaming once
/// complete so a partial download is never mistaken for a cached model.
async fn download_file_streaming(http: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let mut response = http.get(url).send().await.map_err(|e| {
        AppError::model_download_failed(format!("Failed to download {}: {}", url, e))
    })?;

    if !response.status().is_success() {
        return Err(AppError::model_download_failed(format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let partial = dest.with_extension("part");

    let downloaded = match write_partial(&mut response, &partial, dest, total_size).await {
        Ok(downloaded) => downloaded,
        Err(e) => {
            // Never leave a partial file behind.
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    fs::rename(&partial, dest).await.map_err(|e| {
        AppError::model_download_failed(format!(
            "Failed to move {} into place: {}",
            partial.display(),
            e
        ))
    })?;

    let size_mb = downloaded as f64 / (1024.0 * 1024.0);
    info!(file = %dest.display(), "Model downloaded ({:.1} MB)", size_mb);

    Ok(())
}

/// Streams the response body into `partial`, returning the bytes written.
async fn write_partial(
    response: &mut reqwest::Response,
    partial: &Path,
    dest: &Path,
    total_size: u64,
) -> Result<u64> {
    let mut file = fs::File::create(partial).await.map_err(|e| {
        AppError::model_download_failed(format!(
            "Failed to create file {}: {}",
            partial.display(),
            e
        ))
    })?;

    let mut downloaded: u64 = 0;
    let mut last_progress = 0;

    while let Some(chunk) = response.chunk().await.map_err(|e| {
        AppError::model_download_failed(format!("Failed to read response: {}", e))
    })? {
        file.write_all(&chunk).await.map_err(|e| {
            AppError::model_download_failed(format!("Failed to write file: {}", e))
        })?;

        downloaded += chunk.len() as u64;

        // Log progress every 10%
        if total_size > 0 {
            let progress = (downloaded * 100 / total_size) as usize;
            if progress >= last_progress + 10 {
                info!(file = %dest.display(), "Model download {}%", progress);
                last_progress = progress;
            }
        }
    }

    file.flush().await.map_err(|e| {
        AppError::model_download_failed(format!("Failed to flush file: {}", e))
    })?;
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;
    use crate::http::HttpClients;
    use crate::test_server::{serve, Reply};
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn file_name_from_url() {
        assert_eq!(
            model_file_name("https://huggingface.co/x/y/resolve/main/htdemucs_tiny.onnx"),
            "htdemucs_tiny.onnx"
        );
        assert_eq!(model_file_name("https://example.com/"), FALLBACK_MODEL_FILE);
        assert_eq!(model_file_name("not a url"), FALLBACK_MODEL_FILE);
    }

    #[tokio::test]
    async fn cached_model_is_not_downloaded() {
        let dir = tempdir().unwrap();
        let cached = dir.path().join("htdemucs_tiny.onnx");
        std::fs::write(&cached, b"onnx").unwrap();

        // Unroutable URL: reaching the network would fail the test.
        let path = ensure_model(
            &reqwest::Client::new(),
            "http://127.0.0.1:9/htdemucs_tiny.onnx",
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(path, cached);
    }

    #[tokio::test]
    async fn failed_download_reports_error() {
        let dir = tempdir().unwrap();
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();

        let err = ensure_model(&http, "http://127.0.0.1:9/missing.onnx", dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelDownloadFailed);
        assert!(!dir.path().join("missing.onnx").exists());
    }

    #[tokio::test]
    async fn truncated_download_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let server = serve(|_| Reply::truncated(b"onnx-header", 4096)).await;

        let err = ensure_model(&reqwest::Client::new(), &server.url("/cut.onnx"), dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelDownloadFailed);
        assert!(!dir.path().join("cut.onnx").exists());
        assert!(!dir.path().join("cut.part").exists());
    }

    #[tokio::test]
    async fn slow_download_completes_past_api_timeout() {
        let dir = tempdir().unwrap();
        let model = vec![1u8; 4000];
        let server = serve(move |_| Reply::dribble(&model, 5, Duration::from_millis(400))).await;
        let config = AppConfig {
            http_timeout_sec: 1,
            ..AppConfig::default()
        };
        let clients = HttpClients::from_config(&config).unwrap();

        let path = ensure_model(&clients.transfer, &server.url("/slow.onnx"), dir.path())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 4000);
        assert!(!dir.path().join("slow.part").exists());
    }

    #[tokio::test]
    async fn http_error_status_is_download_failure() {
        let dir = tempdir().unwrap();
        let server = serve(|_| Reply::status(404, "not found")).await;

        let err = ensure_model(&reqwest::Client::new(), &server.url("/gone.onnx"), dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ModelDownloadFailed);
        assert!(err.message.contains("404"));
    }
}
