use crate::{
    CaptureError,
    capture::{
        CameraPosition, CaptureEvent, CaptureFormat, CapturePipeline, CaptureSettings,
        CaptureState,
    },
    tests::fakes::FakeCamera,
};

use std::{path::Path, time::Duration};

use tokio::{runtime::Handle, sync::mpsc};

fn settings(dir: &Path, format: CaptureFormat) -> CaptureSettings {
    CaptureSettings {
        position: CameraPosition::Front,
        audio_enabled: true,
        format,
        output_dir: dir.join("RecordedVideos"),
        file_prefix: "Lazulite".to_string(),
    }
}

async fn next_event(rx: &mut mpsc::Receiver<CaptureEvent>) -> CaptureEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for capture event")
        .expect("capture event channel closed")
}

async fn ready_pipeline(
    camera: FakeCamera,
    dir: &Path,
) -> (CapturePipeline, mpsc::Receiver<CaptureEvent>) {
    let (tx, mut rx) = mpsc::channel(8);
    let pipeline = CapturePipeline::new(
        Box::new(camera),
        settings(dir, CaptureFormat::Standard30),
        Handle::current(),
        tx,
    );
    pipeline.configure().unwrap().await.unwrap();
    assert!(matches!(next_event(&mut rx).await, CaptureEvent::Ready(_)));
    (pipeline, rx)
}

/// WHAT: configure acquires the device and reports Ready with the locked format
/// WHY: The booth only enables Start once the preview surface is known
#[tokio::test]
async fn given_fresh_pipeline_when_configuring_then_ready_event_with_requested_fps() {
    // Given: A pipeline configured for high frame rate capture
    let dir = tempfile::tempdir().unwrap();
    let (camera, log) = FakeCamera::new();
    let (tx, mut rx) = mpsc::channel(8);
    let format = CaptureFormat::HighFrameRate { fps: 240 };
    let pipeline =
        CapturePipeline::new(Box::new(camera), settings(dir.path(), format), Handle::current(), tx);

    // When: Configuring
    pipeline.configure().unwrap().await.unwrap();

    // Then: Ready is emitted with the requested frame rate and the format was applied
    match next_event(&mut rx).await {
        CaptureEvent::Ready(surface) => {
            assert_eq!(surface.fps, 240);
            assert!(surface.audio);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(pipeline.state(), CaptureState::Ready);
    let log = log.lock().unwrap();
    assert_eq!(log.opens, 1);
    assert_eq!(log.formats, vec![format]);
}

/// WHAT: A failing camera leaves the pipeline uninitialized
/// WHY: The booth must refuse to start a session without a camera
#[tokio::test]
async fn given_unavailable_camera_when_configuring_then_setup_failed_and_uninitialized() {
    // Given: A camera that cannot be opened
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, _log) = FakeCamera::new();
    camera.fail_open = true;
    let (tx, mut rx) = mpsc::channel(8);
    let pipeline = CapturePipeline::new(
        Box::new(camera),
        settings(dir.path(), CaptureFormat::Standard30),
        Handle::current(),
        tx,
    );

    // When: Configuring
    pipeline.configure().unwrap().await.unwrap();

    // Then: SetupFailed is reported and the state rolls back
    assert!(matches!(
        next_event(&mut rx).await,
        CaptureEvent::SetupFailed { .. }
    ));
    assert_eq!(pipeline.state(), CaptureState::Uninitialized);
}

/// WHAT: Recording cannot start before setup finished
/// WHY: Starting an unconfigured session would write nothing
#[tokio::test]
async fn given_unconfigured_pipeline_when_starting_recording_then_not_ready_error() {
    // Given: A pipeline that was never configured
    let dir = tempfile::tempdir().unwrap();
    let (camera, log) = FakeCamera::new();
    let (tx, _rx) = mpsc::channel(8);
    let pipeline = CapturePipeline::new(
        Box::new(camera),
        settings(dir.path(), CaptureFormat::Standard30),
        Handle::current(),
        tx,
    );

    // When: Starting a recording
    let result = pipeline.start_recording(None).await;

    // Then: Rejected with the current state, device untouched
    assert!(matches!(
        result,
        Err(CaptureError::NotReady {
            state: CaptureState::Uninitialized,
            ..
        })
    ));
    assert!(log.lock().unwrap().starts.is_empty());
}

/// WHAT: Recording writes to a timestamped .mov under the raw directory
/// WHY: Raw files must never overwrite each other
#[tokio::test]
async fn given_ready_pipeline_when_starting_recording_then_timestamped_path_in_output_dir() {
    // Given: A ready pipeline
    let dir = tempfile::tempdir().unwrap();
    let (camera, _log) = FakeCamera::new();
    let (pipeline, _rx) = ready_pipeline(camera, dir.path()).await;

    // When: Starting a recording
    let path = pipeline.start_recording(None).await.unwrap();

    // Then: The path is a Lazulite_*.mov file in RecordedVideos, which now exists
    assert_eq!(path.parent(), Some(dir.path().join("RecordedVideos").as_path()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Lazulite_"));
    assert!(name.ends_with(".mov"));
    assert!(dir.path().join("RecordedVideos").is_dir());
    assert_eq!(pipeline.state(), CaptureState::Recording);
}

/// WHAT: Two concurrent stop requests produce exactly one underlying stop
/// WHY: A manual stop racing the auto-stop timer must not finalize twice
#[tokio::test]
async fn given_recording_when_stopped_twice_concurrently_then_single_stop_and_event() {
    // Given: A recording on a camera whose stop takes a while
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, log) = FakeCamera::new();
    camera.stop_delay = Duration::from_millis(50);
    let (pipeline, mut rx) = ready_pipeline(camera, dir.path()).await;
    let path = pipeline.start_recording(None).await.unwrap();

    // When: Stopping twice at once
    let (first, second) = tokio::join!(pipeline.stop_recording(), pipeline.stop_recording());

    // Then: Only one call did the work, and one finished event carries the path
    assert!(first ^ second);
    assert_eq!(log.lock().unwrap().stops, 1);
    match next_event(&mut rx).await {
        CaptureEvent::RecordingFinished { path: finished, .. } => assert_eq!(finished, path),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(rx.try_recv().is_err());
    assert_eq!(pipeline.state(), CaptureState::Ready);
}

/// WHAT: Stop after the recording already ended is a no-op
/// WHY: stop_recording is idempotent
#[tokio::test]
async fn given_stopped_recording_when_stopping_again_then_no_op() {
    // Given: A recording that was stopped
    let dir = tempfile::tempdir().unwrap();
    let (camera, log) = FakeCamera::new();
    let (pipeline, mut rx) = ready_pipeline(camera, dir.path()).await;
    pipeline.start_recording(None).await.unwrap();
    assert!(pipeline.stop_recording().await);
    next_event(&mut rx).await;

    // When: Stopping again
    let stopped = pipeline.stop_recording().await;

    // Then: Nothing happens
    assert!(!stopped);
    assert_eq!(log.lock().unwrap().stops, 1);
    assert!(rx.try_recv().is_err());
}

/// WHAT: The auto-stop timer finalizes the recording
/// WHY: Booth recordings have a fixed maximum length
#[tokio::test]
async fn given_auto_stop_when_limit_elapses_then_recording_finished() {
    // Given: A recording with a short limit
    let dir = tempfile::tempdir().unwrap();
    let (camera, log) = FakeCamera::new();
    let (pipeline, mut rx) = ready_pipeline(camera, dir.path()).await;
    pipeline
        .start_recording(Some(Duration::from_millis(30)))
        .await
        .unwrap();

    // When: Waiting past the limit
    let event = next_event(&mut rx).await;

    // Then: The recording finished on its own and a late manual stop does nothing
    assert!(matches!(event, CaptureEvent::RecordingFinished { .. }));
    assert!(!pipeline.stop_recording().await);
    assert_eq!(log.lock().unwrap().stops, 1);
}

/// WHAT: A stale auto-stop timer does not cut a newer recording short
/// WHY: Retakes start a new recording before the old timer fires
#[tokio::test]
async fn given_manual_stop_and_new_recording_when_old_timer_fires_then_new_recording_continues() {
    // Given: A recording with a timer, stopped manually, then a second recording
    let dir = tempfile::tempdir().unwrap();
    let (camera, log) = FakeCamera::new();
    let (pipeline, mut rx) = ready_pipeline(camera, dir.path()).await;
    pipeline
        .start_recording(Some(Duration::from_millis(60)))
        .await
        .unwrap();
    assert!(pipeline.stop_recording().await);
    next_event(&mut rx).await;
    pipeline.start_recording(None).await.unwrap();

    // When: The first timer's deadline passes
    tokio::time::sleep(Duration::from_millis(120)).await;

    // Then: The second recording is still running
    assert_eq!(pipeline.state(), CaptureState::Recording);
    assert_eq!(log.lock().unwrap().stops, 1);
}

/// WHAT: A failed finalize is reported and the pipeline recovers
/// WHY: A bad take must not wedge the booth
#[tokio::test]
async fn given_failing_stop_when_stopping_then_recording_failed_and_ready() {
    // Given: A camera whose stop fails
    let dir = tempfile::tempdir().unwrap();
    let (mut camera, _log) = FakeCamera::new();
    camera.fail_stop = true;
    let (pipeline, mut rx) = ready_pipeline(camera, dir.path()).await;
    pipeline.start_recording(None).await.unwrap();

    // When: Stopping
    assert!(pipeline.stop_recording().await);

    // Then: RecordingFailed and back to Ready
    assert!(matches!(
        next_event(&mut rx).await,
        CaptureEvent::RecordingFailed { .. }
    ));
    assert_eq!(pipeline.state(), CaptureState::Ready);
}

/// WHAT: shutdown stops an active recording and closes the device
/// WHY: Devices must be released on exit
#[tokio::test]
async fn given_active_recording_when_shutting_down_then_stopped_and_closed() {
    // Given: An active recording
    let dir = tempfile::tempdir().unwrap();
    let (camera, log) = FakeCamera::new();
    let (pipeline, _rx) = ready_pipeline(camera, dir.path()).await;
    pipeline.start_recording(None).await.unwrap();

    // When: Shutting down
    pipeline.shutdown().await;

    // Then: Stopped once, closed once, uninitialized
    let log = log.lock().unwrap();
    assert_eq!(log.stops, 1);
    assert_eq!(log.closes, 1);
    assert_eq!(pipeline.state(), CaptureState::Uninitialized);
}
