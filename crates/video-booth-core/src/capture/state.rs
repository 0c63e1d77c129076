use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Lifecycle of the capture pipeline.
///
/// `Uninitialized -> Configuring -> Ready -> Recording -> Stopping -> Ready`.
/// A failed setup drops back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No devices acquired.
    Uninitialized,
    /// Devices are being acquired on the background runtime.
    Configuring,
    /// Session running, not writing to a file.
    Ready,
    /// Writing to an output file.
    Recording,
    /// Stop requested, waiting for the file to be finalized.
    Stopping,
}

/// Which camera to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPosition {
    /// User-facing camera.
    #[default]
    Front,
    /// Rear camera.
    Back,
}

/// Frame-rate configuration applied to the camera at configure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum CaptureFormat {
    /// Regular 30 fps capture.
    #[default]
    Standard30,
    /// Slow-motion capable high frame rate capture.
    HighFrameRate {
        /// Requested frames per second (at least 240 to be useful).
        fps: u32,
    },
}

impl CaptureFormat {
    /// Frames per second requested from the device.
    pub fn fps(&self) -> u32 {
        match self {
            CaptureFormat::Standard30 => 30,
            CaptureFormat::HighFrameRate { fps } => *fps,
        }
    }
}

/// Static configuration of a recording session.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Camera to use.
    pub position: CameraPosition,
    /// Whether to attach a microphone input.
    pub audio_enabled: bool,
    /// Frame-rate configuration.
    pub format: CaptureFormat,
    /// Directory raw recordings are written to.
    pub output_dir: PathBuf,
    /// File name prefix for raw recordings.
    pub file_prefix: String,
}

/// What the pipeline hands to its observer once the session is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSurface {
    /// Device the session reads from.
    pub device: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
    /// Whether a microphone was attached.
    pub audio: bool,
}

/// Events emitted by the capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Setup finished, the session is running.
    Ready(PreviewSurface),
    /// Setup failed; the pipeline is back to `Uninitialized`.
    SetupFailed {
        /// Description of the failure.
        reason: String,
    },
    /// A recording was finalized.
    RecordingFinished {
        /// The finished file.
        path: PathBuf,
        /// Wall-clock time spent recording.
        elapsed: Duration,
    },
    /// A recording could not be finalized.
    RecordingFailed {
        /// Description of the failure.
        reason: String,
    },
}
