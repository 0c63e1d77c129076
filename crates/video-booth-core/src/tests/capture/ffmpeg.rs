use crate::{
    CaptureError,
    capture::{
        CameraPosition, CaptureDevice, CaptureFormat, DEFAULT_STOP_TIMEOUT, FfmpegCamera,
        FfmpegCameraConfig,
    },
};

use std::path::{Path, PathBuf};

fn config(front_device: &str) -> FfmpegCameraConfig {
    FfmpegCameraConfig {
        ffmpeg: PathBuf::from("ffmpeg"),
        front_device: front_device.to_string(),
        back_device: "/dev/video2".to_string(),
        audio_source: Some("default".to_string()),
        width: 1280,
        height: 720,
        stop_timeout: DEFAULT_STOP_TIMEOUT,
    }
}

/// WHAT: Recording arguments read the camera at the locked frame rate
/// WHY: The frame rate chosen at configure time must reach the encoder
#[test]
fn given_high_frame_rate_when_building_record_args_then_framerate_and_inputs_match() {
    // Given: A 240 fps format with a microphone
    let format = CaptureFormat::HighFrameRate { fps: 240 };

    // When: Building the arguments
    let args = FfmpegCamera::record_args(
        "/dev/video0",
        Some("default"),
        1280,
        720,
        format,
        Path::new("/tmp/out.mov"),
    );

    // Then: Video and audio inputs plus the mov muxer are present
    let joined = args.join(" ");
    assert!(joined.contains("-f v4l2 -framerate 240 -video_size 1280x720 -i /dev/video0"));
    assert!(joined.contains("-f pulse -i default"));
    assert!(joined.contains("-c:a aac"));
    assert!(joined.ends_with("-f mov /tmp/out.mov"));
}

/// WHAT: Without a microphone no audio input or codec is requested
/// WHY: ffmpeg fails when asked to encode a stream that does not exist
#[test]
fn given_no_audio_source_when_building_record_args_then_video_only() {
    // Given / When: Arguments without an audio source
    let args = FfmpegCamera::record_args(
        "/dev/video0",
        None,
        1920,
        1080,
        CaptureFormat::Standard30,
        Path::new("out.mov"),
    );

    // Then: No pulse input and no audio codec
    assert!(!args.iter().any(|a| a == "pulse"));
    assert!(!args.iter().any(|a| a == "-c:a"));
    assert!(args.iter().any(|a| a == "30"));
}

/// WHAT: Opening a missing V4L2 device fails with CameraUnavailable
/// WHY: Setup failure must name the device that is missing
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn given_missing_device_when_opening_then_camera_unavailable() {
    // Given: A camera pointing at a device node that does not exist
    let mut camera = FfmpegCamera::new(config("/dev/does-not-exist"));

    // When: Opening it (requires ffmpeg on PATH)
    let result = camera.open(CameraPosition::Front, true).await;

    // Then: CameraUnavailable names the device
    match result {
        Err(CaptureError::CameraUnavailable { device, .. }) => {
            assert_eq!(device, "/dev/does-not-exist")
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
