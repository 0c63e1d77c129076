use crate::{
    EditError,
    edit::{ContainerType, ExportPreset, ExportStatus, SlowMotionSpec, VideoEditor},
    tests::fakes::{FakeToolkit, media},
};

use std::{path::Path, time::Duration};

use tokio::runtime::Handle;

fn default_spec() -> SlowMotionSpec {
    SlowMotionSpec::new(Duration::from_secs(1), Duration::from_secs(3), 3.0).unwrap()
}

/// WHAT: A source without audio fails before anything is exported
/// WHY: The booth expects every edited video to carry sound
#[tokio::test]
async fn given_source_without_audio_when_applying_slow_motion_then_missing_audio_and_no_export() {
    // Given: A video-only source
    let toolkit = FakeToolkit::new(media(10, true, false), ExportStatus::Completed);
    let editor = VideoEditor::new(toolkit.clone());

    // When: Applying slow motion
    let result = editor
        .apply_slow_motion(Path::new("raw.mov"), default_spec(), Path::new("out.mov"))
        .await;

    // Then: MissingAudioTrack, exporter never invoked
    assert!(matches!(result, Err(EditError::MissingAudioTrack { .. })));
    assert_eq!(toolkit.export_count(), 0);
}

/// WHAT: A source without video fails with MissingVideoTrack
/// WHY: Audio-only files cannot be turned into a booth clip
#[tokio::test]
async fn given_source_without_video_when_applying_slow_motion_then_missing_video() {
    let toolkit = FakeToolkit::new(media(10, false, true), ExportStatus::Completed);
    let editor = VideoEditor::new(toolkit.clone());

    let result = editor
        .apply_slow_motion(Path::new("raw.mov"), default_spec(), Path::new("out.mov"))
        .await;

    assert!(matches!(result, Err(EditError::MissingVideoTrack { .. })));
    assert_eq!(toolkit.export_count(), 0);
}

/// WHAT: A successful export returns the output path and a 16s composition
/// WHY: The preview screen plays whatever path comes back
#[tokio::test]
async fn given_ten_second_source_when_applying_slow_motion_then_sixteen_second_mov_export() {
    // Given: A 10s source with both tracks
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("EditedVideos").join("Lazulite_edit.mov");
    let toolkit = FakeToolkit::new(media(10, true, true), ExportStatus::Completed);
    let editor = VideoEditor::new(toolkit.clone());

    // When: Applying the default effect
    let result = editor
        .apply_slow_motion(Path::new("raw.mov"), default_spec(), &output)
        .await
        .unwrap();

    // Then: Output path returned, directory created, request is HQ mov of 16s
    assert_eq!(result, output);
    assert!(dir.path().join("EditedVideos").is_dir());

    let exports = toolkit.exports.lock().unwrap();
    assert_eq!(exports.len(), 1);
    let request = &exports[0];
    assert_eq!(request.preset, ExportPreset::HighestQuality);
    assert_eq!(request.container, ContainerType::Mov);
    assert_eq!(request.source, Path::new("raw.mov"));
    let seconds = request.composition.duration().as_secs_f64();
    assert!((seconds - 16.0).abs() < 1e-6, "duration was {seconds}");
}

/// WHAT: Any export status other than Completed is an error
/// WHY: A failed or cancelled export leaves no usable file
#[tokio::test]
async fn given_failed_or_cancelled_export_when_applying_slow_motion_then_export_failed() {
    for status in [
        ExportStatus::Failed {
            reason: "encoder crashed".to_string(),
        },
        ExportStatus::Cancelled,
    ] {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = FakeToolkit::new(media(10, true, true), status.clone());
        let editor = VideoEditor::new(toolkit);

        let result = editor
            .apply_slow_motion(
                Path::new("raw.mov"),
                default_spec(),
                &dir.path().join("out.mov"),
            )
            .await;

        match result {
            Err(EditError::ExportFailed { status: got, .. }) => assert_eq!(got, status),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

/// WHAT: A window starting past the end of a short source is rejected unexported
/// WHY: Nothing to slow down means nothing to export
#[tokio::test]
async fn given_short_source_when_window_starts_after_end_then_invalid_window() {
    let toolkit = FakeToolkit::new(media(1, true, true), ExportStatus::Completed);
    let editor = VideoEditor::new(toolkit.clone());
    let spec = SlowMotionSpec::new(Duration::from_secs(2), Duration::from_secs(3), 3.0).unwrap();

    let result = editor
        .apply_slow_motion(Path::new("raw.mov"), spec, Path::new("out.mov"))
        .await;

    assert!(matches!(result, Err(EditError::InvalidWindow { .. })));
    assert_eq!(toolkit.export_count(), 0);
}

/// WHAT: Spawned jobs deliver their result through the join handle
/// WHY: The controller runs exports in the background and awaits results as messages
#[tokio::test]
async fn given_spawned_job_when_awaited_then_output_path_returned() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("spawned.mov");
    let toolkit = FakeToolkit::new(media(10, true, true), ExportStatus::Completed);
    let editor = VideoEditor::new(toolkit);

    let job = editor.spawn_slow_motion(
        &Handle::current(),
        "raw.mov".into(),
        default_spec(),
        output.clone(),
    );

    assert_eq!(job.await.unwrap().unwrap(), output);
}
