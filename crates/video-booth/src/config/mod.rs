mod booth_config;
mod booth_settings;
mod camera_config;
#[allow(clippy::module_inception)]
mod config;
mod peripheral_config;
mod server_config;
mod slow_motion_config;
mod storage_config;
mod upload_config;

pub(crate) use {
    booth_config::BoothConfig,
    booth_settings::BoothSettings,
    camera_config::CameraConfig,
    config::Config,
    peripheral_config::PeripheralConfig,
    server_config::ServerConfig,
    slow_motion_config::SlowMotionConfig,
    storage_config::{StorageConfig, StorageDirs},
    upload_config::UploadConfig,
};

use std::path::PathBuf;

use video_booth_core::capture::{CameraPosition, CaptureFormat};

pub(crate) const DEFAULT_RECORD_SECONDS: u64 = 10;
pub(crate) const DEFAULT_COUNTDOWN_SECONDS: u64 = 3;
pub(crate) const DEFAULT_FILE_PREFIX: &str = "Lazulite";

pub(crate) const DEFAULT_SLOW_MOTION_START_SECONDS: f64 = 1.0;
pub(crate) const DEFAULT_SLOW_MOTION_DURATION_SECONDS: f64 = 3.0;
pub(crate) const DEFAULT_SLOW_MOTION_MULTIPLIER: f64 = video_booth_core::edit::DEFAULT_MULTIPLIER;

pub(crate) const DEFAULT_ARM_COMMAND: &str = "1";
pub(crate) const DEFAULT_POLL_SECONDS: u64 = 10;
pub(crate) const DEFAULT_SCAN_SECONDS: u64 = 10;

pub(crate) const DEFAULT_FRONT_DEVICE: &str = "/dev/video0";
pub(crate) const DEFAULT_BACK_DEVICE: &str = "/dev/video2";
pub(crate) const DEFAULT_AUDIO_SOURCE: &str = "default";
pub(crate) const DEFAULT_WIDTH: u32 = 1920;
pub(crate) const DEFAULT_HEIGHT: u32 = 1080;
pub(crate) const DEFAULT_FFMPEG: &str = "ffmpeg";
pub(crate) const DEFAULT_FFPROBE: &str = "ffprobe";

pub(crate) const DEFAULT_UPLOAD_URL: &str = "https://lazulite.online/routes/Lazulite/upload-video";
pub(crate) const DEFAULT_DOWNLOAD_URL: &str =
    "https://lazulite.online/routes/Lazulite/DownloadVideo";
pub(crate) const DEFAULT_UPLOAD_TIMEOUT_SECONDS: u64 = 120;

pub(crate) const DEFAULT_PORT: u16 = 7878;

pub(crate) fn default_record_seconds() -> u64 {
    DEFAULT_RECORD_SECONDS
}

pub(crate) fn default_countdown_seconds() -> u64 {
    DEFAULT_COUNTDOWN_SECONDS
}

pub(crate) fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

pub(crate) fn default_slow_motion_start_seconds() -> f64 {
    DEFAULT_SLOW_MOTION_START_SECONDS
}

pub(crate) fn default_slow_motion_duration_seconds() -> f64 {
    DEFAULT_SLOW_MOTION_DURATION_SECONDS
}

pub(crate) fn default_slow_motion_multiplier() -> f64 {
    DEFAULT_SLOW_MOTION_MULTIPLIER
}

pub(crate) fn default_arm_command() -> String {
    DEFAULT_ARM_COMMAND.to_string()
}

pub(crate) fn default_poll_seconds() -> u64 {
    DEFAULT_POLL_SECONDS
}

pub(crate) fn default_scan_seconds() -> u64 {
    DEFAULT_SCAN_SECONDS
}

pub(crate) fn default_camera_position() -> CameraPosition {
    CameraPosition::Front
}

pub(crate) fn default_audio_enabled() -> bool {
    true
}

pub(crate) fn default_capture_format() -> CaptureFormat {
    CaptureFormat::Standard30
}

pub(crate) fn default_front_device() -> String {
    DEFAULT_FRONT_DEVICE.to_string()
}

pub(crate) fn default_back_device() -> String {
    DEFAULT_BACK_DEVICE.to_string()
}

pub(crate) fn default_audio_source() -> Option<String> {
    Some(DEFAULT_AUDIO_SOURCE.to_string())
}

pub(crate) fn default_width() -> u32 {
    DEFAULT_WIDTH
}

pub(crate) fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

pub(crate) fn default_ffmpeg() -> PathBuf {
    PathBuf::from(DEFAULT_FFMPEG)
}

pub(crate) fn default_ffprobe() -> PathBuf {
    PathBuf::from(DEFAULT_FFPROBE)
}

pub(crate) fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

pub(crate) fn default_download_url() -> String {
    DEFAULT_DOWNLOAD_URL.to_string()
}

pub(crate) fn default_upload_timeout_seconds() -> u64 {
    DEFAULT_UPLOAD_TIMEOUT_SECONDS
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}
