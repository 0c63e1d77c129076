use crate::config::{
    default_audio_enabled, default_audio_source, default_back_device, default_camera_position,
    default_capture_format, default_ffmpeg, default_ffprobe, default_front_device,
    default_height, default_width,
};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use video_booth_core::capture::{CameraPosition, CaptureFormat};

/// Camera, microphone and media tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera to record with.
    #[serde(default = "default_camera_position")]
    pub position: CameraPosition,
    /// Whether to record sound.
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,
    /// Frame-rate configuration applied at setup.
    #[serde(default = "default_capture_format")]
    pub format: CaptureFormat,
    /// V4L2 device of the front camera.
    #[serde(default = "default_front_device")]
    pub front_device: String,
    /// V4L2 device of the back camera.
    #[serde(default = "default_back_device")]
    pub back_device: String,
    /// PulseAudio source of the microphone.
    #[serde(default = "default_audio_source")]
    pub audio_source: Option<String>,
    /// Capture width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Capture height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// ffmpeg binary.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    /// ffprobe binary.
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            audio_enabled: default_audio_enabled(),
            format: default_capture_format(),
            front_device: default_front_device(),
            back_device: default_back_device(),
            audio_source: default_audio_source(),
            width: default_width(),
            height: default_height(),
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}
