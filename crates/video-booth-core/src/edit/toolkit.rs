use crate::{EditResult, edit::Composition};

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;

/// Track and duration information about a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    /// Container duration.
    pub duration: Duration,
    /// Whether at least one video stream exists.
    pub has_video: bool,
    /// Whether at least one audio stream exists.
    pub has_audio: bool,
}

/// Encoding quality for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPreset {
    /// Best quality the encoder offers.
    #[default]
    HighestQuality,
}

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerType {
    /// QuickTime movie.
    #[default]
    Mov,
}

impl ContainerType {
    /// Muxer / file extension name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerType::Mov => "mov",
        }
    }
}

/// Final state of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// Output written.
    Completed,
    /// Export ran and failed.
    Failed {
        /// Description from the exporter.
        reason: String,
    },
    /// Export was aborted before finishing.
    Cancelled,
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStatus::Completed => write!(f, "completed"),
            ExportStatus::Failed { reason } => write!(f, "failed: {reason}"),
            ExportStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Everything an exporter needs to render a composition.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// File the composition's segments refer to.
    pub source: PathBuf,
    /// Timeline to render.
    pub composition: Composition,
    /// Destination file.
    pub output: PathBuf,
    /// Encoding quality.
    pub preset: ExportPreset,
    /// Output container.
    pub container: ContainerType,
}

/// Media inspection and composition export.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Read duration and track presence of `source`.
    async fn probe(&self, source: &Path) -> EditResult<MediaInfo>;

    /// Render `request.composition` to `request.output`.
    async fn export(&self, request: &ExportRequest) -> EditResult<ExportStatus>;
}
