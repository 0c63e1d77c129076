use crate::{
    CaptureResult,
    capture::{CameraPosition, CaptureFormat, PreviewSurface},
};

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Camera + microphone + movie-file output.
///
/// Implementations are only ever driven through the pipeline's device lock,
/// so calls never overlap.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Acquire the camera (and the microphone when `audio` is set) and start
    /// the session.
    async fn open(&mut self, position: CameraPosition, audio: bool)
    -> CaptureResult<PreviewSurface>;

    /// Lock the device to a frame-rate configuration.
    async fn apply_format(&mut self, format: CaptureFormat) -> CaptureResult<()>;

    /// Begin writing a movie file to `output`.
    async fn start(&mut self, output: &Path) -> CaptureResult<()>;

    /// Finish the current file and return its path.
    async fn stop(&mut self) -> CaptureResult<PathBuf>;

    /// Stop the session and release the devices.
    async fn close(&mut self);
}
