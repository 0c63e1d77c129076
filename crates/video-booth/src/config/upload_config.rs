use crate::config::{default_download_url, default_upload_timeout_seconds, default_upload_url};

use serde::{Deserialize, Serialize};

/// Remote upload endpoint and download link base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Multipart POST endpoint for finished videos.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Base URL the QR download link points to.
    #[serde(default = "default_download_url")]
    pub download_url: String,
    /// Whole-request timeout for an upload.
    #[serde(default = "default_upload_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_url: default_upload_url(),
            download_url: default_download_url(),
            timeout_seconds: default_upload_timeout_seconds(),
        }
    }
}
