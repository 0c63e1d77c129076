//! Camera backend that records through an `ffmpeg` child process.
//!
//! Video comes from a V4L2 device, audio (optional) from a PulseAudio source.
//! Stopping writes `q` to ffmpeg's stdin so the container is finalized
//! properly; the child is killed if it does not exit in time.

use crate::{
    CaptureError, CaptureResult,
    capture::{CameraPosition, CaptureDevice, CaptureFormat, PreviewSurface},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{
    io::AsyncWriteExt,
    process::{Child, Command},
};
use tracing::{debug, info, instrument, warn};

/// How long ffmpeg gets to finalize the file after `q`.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Device and tool locations for [`FfmpegCamera`].
#[derive(Debug, Clone)]
pub struct FfmpegCameraConfig {
    /// Path or name of the ffmpeg binary.
    pub ffmpeg: PathBuf,
    /// V4L2 device of the front camera.
    pub front_device: String,
    /// V4L2 device of the back camera.
    pub back_device: String,
    /// PulseAudio source name; `None` disables the microphone.
    pub audio_source: Option<String>,
    /// Capture width in pixels.
    pub width: u32,
    /// Capture height in pixels.
    pub height: u32,
    /// Grace period for finalizing a recording.
    pub stop_timeout: Duration,
}

/// Session parameters fixed at `open` time.
#[derive(Debug, Clone)]
struct OpenSession {
    video_device: String,
    audio_source: Option<String>,
}

/// Records movie files by running ffmpeg.
pub struct FfmpegCamera {
    config: FfmpegCameraConfig,
    session: Option<OpenSession>,
    format: CaptureFormat,
    child: Option<Child>,
    output: Option<PathBuf>,
}

impl FfmpegCamera {
    /// Creates a closed camera.
    pub fn new(config: FfmpegCameraConfig) -> Self {
        Self {
            config,
            session: None,
            format: CaptureFormat::default(),
            child: None,
            output: None,
        }
    }

    /// Arguments for recording `output` from `video_device`.
    pub fn record_args(
        video_device: &str,
        audio_source: Option<&str>,
        width: u32,
        height: u32,
        format: CaptureFormat,
        output: &Path,
    ) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-f".into(),
            "v4l2".into(),
            "-framerate".into(),
            format.fps().to_string(),
            "-video_size".into(),
            format!("{width}x{height}"),
            "-i".into(),
            video_device.into(),
        ];

        if let Some(source) = audio_source {
            args.extend(["-f".into(), "pulse".into(), "-i".into(), source.into()]);
        }

        args.extend([
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "veryfast".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ]);

        if audio_source.is_some() {
            args.extend(["-c:a".into(), "aac".into()]);
        }

        args.extend(["-f".into(), "mov".into(), output.to_string_lossy().into_owned()]);
        args
    }

    async fn check_ffmpeg(&self) -> CaptureResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let status = Command::new(&self.config.ffmpeg)
            .arg("-hide_banner")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CaptureError::ToolUnavailable {
                tool: self.config.ffmpeg.display().to_string(),
                reason: e.to_string(),
                location,
            })?;

        if !status.success() {
            return Err(CaptureError::ToolUnavailable {
                tool: self.config.ffmpeg.display().to_string(),
                reason: format!("exited with {status}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CaptureDevice for FfmpegCamera {
    #[instrument(skip(self))]
    async fn open(
        &mut self,
        position: CameraPosition,
        audio: bool,
    ) -> CaptureResult<PreviewSurface> {
        self.check_ffmpeg().await?;

        let video_device = match position {
            CameraPosition::Front => self.config.front_device.clone(),
            CameraPosition::Back => self.config.back_device.clone(),
        };

        if !Path::new(&video_device).exists() {
            return Err(CaptureError::CameraUnavailable {
                device: video_device,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let audio_source = if audio {
            let source = self.config.audio_source.clone();
            if source.is_none() {
                warn!("Microphone requested but no audio source configured, recording without audio");
            }
            source
        } else {
            None
        };

        let surface = PreviewSurface {
            device: video_device.clone(),
            width: self.config.width,
            height: self.config.height,
            fps: self.format.fps(),
            audio: audio_source.is_some(),
        };

        self.session = Some(OpenSession {
            video_device,
            audio_source,
        });

        info!(device = %surface.device, audio = surface.audio, "Camera opened");

        Ok(surface)
    }

    #[instrument(skip(self))]
    async fn apply_format(&mut self, format: CaptureFormat) -> CaptureResult<()> {
        if self.child.is_some() {
            return Err(CaptureError::DeviceError {
                reason: "Cannot change format while recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.format = format;
        debug!(fps = format.fps(), "Frame rate locked");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn start(&mut self, output: &Path) -> CaptureResult<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| CaptureError::DeviceError {
                reason: "Camera is not open".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if self.child.is_some() {
            return Err(CaptureError::DeviceError {
                reason: "Recording already in progress".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let args = Self::record_args(
            &session.video_device,
            session.audio_source.as_deref(),
            self.config.width,
            self.config.height,
            self.format,
            output,
        );

        let child = Command::new(&self.config.ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::RecordingFailed {
                reason: format!("Failed to spawn ffmpeg: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(pid = ?child.id(), output = ?output, "ffmpeg recording process started");

        self.child = Some(child);
        self.output = Some(output.to_path_buf());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> CaptureResult<PathBuf> {
        let mut child = self.child.take().ok_or_else(|| CaptureError::DeviceError {
            reason: "No recording in progress".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let output = self.output.take().ok_or_else(|| CaptureError::DeviceError {
            reason: "No output path for recording".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(b"q").await {
                warn!(error = %e, "Failed to send quit to ffmpeg");
            }
            drop(stdin);
        }

        let status = match tokio::time::timeout(self.config.stop_timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(CaptureError::RecordingFailed {
                    reason: format!("Failed to wait for ffmpeg: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.stop_timeout.as_millis(),
                    "ffmpeg did not exit in time, killing"
                );
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill ffmpeg");
                }
                return Err(CaptureError::RecordingFailed {
                    reason: "ffmpeg did not finalize the recording in time".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        if !status.success() || !output.exists() {
            return Err(CaptureError::RecordingFailed {
                reason: format!("ffmpeg exited with {status}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(output)
    }

    #[instrument(skip(self))]
    async fn close(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill ffmpeg on close");
            }
        }
        self.output = None;
        self.session = None;
        debug!("Camera closed");
    }
}
