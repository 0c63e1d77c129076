mod device;
mod ffmpeg;
mod pipeline;
mod state;

pub use {
    device::CaptureDevice,
    ffmpeg::{DEFAULT_STOP_TIMEOUT, FfmpegCamera, FfmpegCameraConfig},
    pipeline::CapturePipeline,
    state::{
        CameraPosition, CaptureEvent, CaptureFormat, CaptureSettings, CaptureState,
        PreviewSurface,
    },
};
