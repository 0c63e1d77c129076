use crate::{
    EditError,
    edit::{
        Composition, ContainerType, ExportPreset, ExportRequest, FfmpegToolkit, MediaToolkit,
        TimeRange,
    },
};

use std::{path::PathBuf, time::Duration};

const PROBE_JSON: &str = r#"{
    "streams": [
        { "index": 0, "codec_type": "video", "codec_name": "h264" },
        { "index": 1, "codec_type": "audio", "codec_name": "aac" }
    ],
    "format": { "filename": "raw.mov", "duration": "10.500000" }
}"#;

fn slowed_request() -> ExportRequest {
    let mut composition = Composition::from_source(Duration::from_secs(10), true);
    composition.scale_time_range(
        TimeRange::new(Duration::from_secs(1), Duration::from_secs(3)),
        Duration::from_secs(9),
    );
    ExportRequest {
        source: PathBuf::from("raw.mov"),
        composition,
        output: PathBuf::from("edited.mov"),
        preset: ExportPreset::HighestQuality,
        container: ContainerType::Mov,
    }
}

/// WHAT: ffprobe JSON yields duration and track presence
/// WHY: Track checks happen before any export is attempted
#[test]
fn given_ffprobe_json_when_parsing_then_duration_and_tracks() {
    let info = FfmpegToolkit::parse_probe(PROBE_JSON).unwrap();

    assert_eq!(info.duration, Duration::from_millis(10500));
    assert!(info.has_video);
    assert!(info.has_audio);
}

/// WHAT: Output without a duration is a probe failure
/// WHY: A composition cannot be built without knowing the source length
#[test]
fn given_ffprobe_json_without_duration_when_parsing_then_probe_failed() {
    let result = FfmpegToolkit::parse_probe(r#"{ "streams": [], "format": {} }"#);

    assert!(matches!(result, Err(EditError::ProbeFailed { .. })));
}

/// WHAT: Durations that do not fit a Duration are a probe failure
/// WHY: Malformed ffprobe output must not crash the export job
#[test]
fn given_out_of_range_duration_when_parsing_then_probe_failed() {
    for duration in ["-1.0", "1e30", "inf", "NaN"] {
        let json = format!(r#"{{ "streams": [], "format": {{ "duration": "{duration}" }} }}"#);

        let result = FfmpegToolkit::parse_probe(&json);

        assert!(
            matches!(result, Err(EditError::ProbeFailed { .. })),
            "duration {duration} accepted"
        );
    }
}

/// WHAT: One-third speed audio is split into atempo factors within 0.5..=2
/// WHY: atempo rejects factors outside that range
#[test]
fn given_one_third_tempo_when_building_atempo_chain_then_factors_in_range_with_same_product() {
    let chain = FfmpegToolkit::atempo_chain(1.0 / 3.0);

    assert_eq!(chain.len(), 2);
    assert!(chain.iter().all(|f| (0.5..=2.0).contains(f)));
    let product: f64 = chain.iter().product();
    assert!((product - 1.0 / 3.0).abs() < 1e-9);
}

/// WHAT: Normal speed needs no atempo filter
/// WHY: Untouched segments should pass audio through unchanged
#[test]
fn given_unit_tempo_when_building_atempo_chain_then_empty() {
    assert!(FfmpegToolkit::atempo_chain(1.0).is_empty());
}

/// WHAT: The filter graph trims each segment and concatenates them
/// WHY: Segments play in order with video and audio in lockstep
#[test]
fn given_slowed_composition_when_building_filter_graph_then_three_segments_concatenated() {
    let graph = FfmpegToolkit::filter_graph(&slowed_request().composition);

    assert!(graph.contains(
        "[0:v]trim=start=1.000000:duration=3.000000,setpts=3.000000*(PTS-STARTPTS)[v1]"
    ));
    assert!(graph.contains("[0:a]atrim=start=1.000000:duration=3.000000,asetpts=PTS-STARTPTS,atempo=0.500000,atempo=0.666667[a1]"));
    assert!(graph.ends_with("[v0][a0][v1][a1][v2][a2]concat=n=3:v=1:a=1[outv][outa]"));
}

/// WHAT: Video-only compositions concatenate without audio
/// WHY: concat fails when told to expect audio pads that are not there
#[test]
fn given_video_only_composition_when_building_filter_graph_then_no_audio_pads() {
    let composition = Composition::from_source(Duration::from_secs(4), false);

    let graph = FfmpegToolkit::filter_graph(&composition);

    assert!(!graph.contains("[0:a]"));
    assert!(graph.ends_with("[v0]concat=n=1:v=1:a=0[outv]"));
}

/// WHAT: HighestQuality maps to x264 CRF 17 slow and AAC 320k in a mov
/// WHY: The edited clip is the deliverable and must not lose quality
#[test]
fn given_highest_quality_request_when_building_export_args_then_quality_flags_present() {
    let args = FfmpegToolkit::export_args(&slowed_request());
    let joined = args.join(" ");

    assert!(joined.starts_with("-hide_banner -loglevel error -y -i raw.mov -filter_complex "));
    assert!(joined.contains("-map [outv] -map [outa]"));
    assert!(joined.contains("-c:v libx264 -preset slow -crf 17"));
    assert!(joined.contains("-c:a aac -b:a 320k"));
    assert!(joined.ends_with("-f mov edited.mov"));
}

/// WHAT: Probing a missing file fails with ProbeFailed
/// WHY: ffprobe errors must surface instead of producing a zero-length clip
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn given_missing_file_when_probing_then_probe_failed() {
    let toolkit = FfmpegToolkit::new("ffmpeg", "ffprobe");

    let result = toolkit
        .probe(std::path::Path::new("/nonexistent/raw.mov"))
        .await;

    assert!(matches!(result, Err(EditError::ProbeFailed { .. })));
}
