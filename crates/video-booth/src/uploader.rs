use crate::{AppError, AppResult};

use std::{panic::Location, path::Path, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::{StatusCode, Url, multipart};
use tracing::{info, instrument, warn};

const VIDEO_FIELD: &str = "video";
const VIDEO_FILE_NAME: &str = "video.mov";
const VIDEO_MIME: &str = "video/quicktime";

/// Sends a finished video to the remote store.
#[async_trait]
pub trait VideoUploader: Send + Sync {
    /// Upload `path` and return the server-side file name.
    async fn upload(&self, path: &Path) -> AppResult<String>;
}

/// Multipart POST uploader.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    upload_url: String,
}

impl HttpUploader {
    /// Uploader posting to `upload_url`, giving up after `timeout`.
    #[track_caller]
    pub fn new(upload_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::UploadFailed {
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            client,
            upload_url: upload_url.into(),
        })
    }
}

#[async_trait]
impl VideoUploader for HttpUploader {
    #[instrument(skip(self))]
    async fn upload(&self, path: &Path) -> AppResult<String> {
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();

        let part = multipart::Part::bytes(bytes)
            .file_name(VIDEO_FILE_NAME)
            .mime_str(VIDEO_MIME)
            .map_err(|e| AppError::UploadFailed {
                reason: format!("Failed to create multipart part: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let form = multipart::Form::new().part(VIDEO_FIELD, part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed {
                reason: format!("Upload request failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AppError::UploadFailed {
            reason: format!("Failed to read upload response: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let file_name = parse_upload_response(status, &body)?;
        info!(size_bytes = size, file_name = %file_name, "Video uploaded");
        Ok(file_name)
    }
}

/// Server file name from an upload response.
///
/// # Errors
///
/// `UploadFailed` on a non-2xx status or an empty body.
#[track_caller]
pub fn parse_upload_response(status: StatusCode, body: &str) -> AppResult<String> {
    if !status.is_success() {
        warn!(status = %status, "Upload rejected");
        return Err(AppError::UploadFailed {
            reason: format!("Server returned {}: {}", status, body.trim()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let name = body.trim();
    if name.is_empty() {
        return Err(AppError::UploadFailed {
            reason: "Server returned an empty file name".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(name.to_string())
}

/// `<download_url>?filename=<name>`.
#[track_caller]
pub fn download_link(download_url: &str, file_name: &str) -> AppResult<String> {
    let url = Url::parse_with_params(download_url, &[("filename", file_name)]).map_err(|e| {
        AppError::ConfigError {
            reason: format!("Invalid download URL {}: {}", download_url, e),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    Ok(url.to_string())
}
