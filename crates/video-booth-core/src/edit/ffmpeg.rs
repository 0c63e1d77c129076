//! [`MediaToolkit`] backed by the `ffprobe` and `ffmpeg` command line tools.

use crate::{
    EditError, EditResult,
    edit::{
        Composition, ExportPreset, ExportRequest, ExportStatus, MediaInfo, MediaToolkit, Segment,
        TrackKind,
    },
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument};

/// atempo accepts factors in this range per filter instance.
const ATEMPO_MIN: f64 = 0.5;
const ATEMPO_MAX: f64 = 2.0;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probes with ffprobe and exports with an ffmpeg filter graph.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegToolkit {
    /// Uses the given tool paths (plain names are looked up on `PATH`).
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Parse ffprobe's `-print_format json -show_format -show_streams` output.
    #[track_caller]
    pub fn parse_probe(json: &str) -> EditResult<MediaInfo> {
        let probe: ProbeOutput =
            serde_json::from_str(json).map_err(|e| EditError::ProbeFailed {
                reason: format!("Failed to parse ffprobe output: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let duration = probe
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.trim().parse::<f64>().ok())
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .ok_or_else(|| EditError::ProbeFailed {
                reason: "ffprobe reported no usable duration".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let has = |kind: &str| {
            probe
                .streams
                .iter()
                .any(|s| s.codec_type.as_deref() == Some(kind))
        };

        Ok(MediaInfo {
            duration,
            has_video: has("video"),
            has_audio: has("audio"),
        })
    }

    /// atempo factors whose product is `tempo`, each within atempo's range.
    pub fn atempo_chain(tempo: f64) -> Vec<f64> {
        let mut factors = Vec::new();
        let mut remaining = tempo;

        while remaining < ATEMPO_MIN {
            factors.push(ATEMPO_MIN);
            remaining /= ATEMPO_MIN;
        }
        while remaining > ATEMPO_MAX {
            factors.push(ATEMPO_MAX);
            remaining /= ATEMPO_MAX;
        }
        if (remaining - 1.0).abs() > f64::EPSILON {
            factors.push(remaining);
        }

        factors
    }

    /// `-filter_complex` graph that renders `composition` from input 0 into
    /// `[outv]` (and `[outa]` when the composition has audio).
    pub fn filter_graph(composition: &Composition) -> String {
        let video = composition
            .track(TrackKind::Video)
            .map(|t| t.segments.as_slice())
            .unwrap_or_default();
        let audio = composition
            .track(TrackKind::Audio)
            .map(|t| t.segments.as_slice());

        let mut chains = Vec::new();
        let mut concat_inputs = String::new();

        for (i, segment) in video.iter().enumerate() {
            chains.push(format!(
                "[0:v]trim=start={}:duration={},setpts={:.6}*(PTS-STARTPTS)[v{i}]",
                secs(segment.source.start),
                secs(segment.source.duration),
                segment.stretch()
            ));
            concat_inputs.push_str(&format!("[v{i}]"));

            if let Some(segment) = audio.and_then(|a| a.get(i)) {
                chains.push(Self::audio_chain(i, segment));
                concat_inputs.push_str(&format!("[a{i}]"));
            }
        }

        let has_audio = audio.is_some_and(|a| !a.is_empty());
        let outputs = if has_audio { "[outv][outa]" } else { "[outv]" };

        chains.push(format!(
            "{concat_inputs}concat=n={}:v=1:a={}{outputs}",
            video.len(),
            u8::from(has_audio)
        ));

        chains.join(";")
    }

    fn audio_chain(index: usize, segment: &Segment) -> String {
        let mut chain = format!(
            "[0:a]atrim=start={}:duration={},asetpts=PTS-STARTPTS",
            secs(segment.source.start),
            secs(segment.source.duration)
        );
        for factor in Self::atempo_chain(1.0 / segment.stretch()) {
            chain.push_str(&format!(",atempo={factor:.6}"));
        }
        chain.push_str(&format!("[a{index}]"));
        chain
    }

    /// Full ffmpeg argument list for `request`.
    pub fn export_args(request: &ExportRequest) -> Vec<String> {
        let has_audio = request
            .composition
            .track(TrackKind::Audio)
            .is_some_and(|t| !t.segments.is_empty());

        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            request.source.to_string_lossy().into_owned(),
            "-filter_complex".into(),
            Self::filter_graph(&request.composition),
            "-map".into(),
            "[outv]".into(),
        ];

        if has_audio {
            args.extend(["-map".into(), "[outa]".into()]);
        }

        match request.preset {
            ExportPreset::HighestQuality => {
                args.extend([
                    "-c:v".into(),
                    "libx264".into(),
                    "-preset".into(),
                    "slow".into(),
                    "-crf".into(),
                    "17".into(),
                    "-pix_fmt".into(),
                    "yuv420p".into(),
                ]);
                if has_audio {
                    args.extend(["-c:a".into(), "aac".into(), "-b:a".into(), "320k".into()]);
                }
            }
        }

        args.extend([
            "-f".into(),
            request.container.as_str().into(),
            request.output.to_string_lossy().into_owned(),
        ]);

        args
    }
}

fn secs(d: Duration) -> String {
    format!("{:.6}", d.as_secs_f64())
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    #[instrument(skip(self))]
    async fn probe(&self, source: &Path) -> EditResult<MediaInfo> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EditError::ProbeFailed {
                reason: format!("Failed to run {}: {}", self.ffprobe.display(), e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !output.status.success() {
            return Err(EditError::ProbeFailed {
                reason: format!(
                    "ffprobe exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let info = Self::parse_probe(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            duration_ms = info.duration.as_millis(),
            has_video = info.has_video,
            has_audio = info.has_audio,
            "Source probed"
        );
        Ok(info)
    }

    #[instrument(skip(self, request), fields(output = ?request.output))]
    async fn export(&self, request: &ExportRequest) -> EditResult<ExportStatus> {
        let args = Self::export_args(request);
        debug!(args = ?args, "Running ffmpeg export");

        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await;

        let status = match output {
            Ok(out) if out.status.success() && request.output.exists() => ExportStatus::Completed,
            Ok(out) => ExportStatus::Failed {
                reason: format!(
                    "ffmpeg exited with {}: {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            },
            Err(e) => ExportStatus::Failed {
                reason: format!("Failed to run {}: {}", self.ffmpeg.display(), e),
            },
        };

        Ok(status)
    }
}
